//! Nexura Admin library.
//!
//! The admin console as a library, so the CLI can create admin accounts
//! and tests can reach the services.
//!
//! # Security
//!
//! This crate has write access to the whole document store and to the
//! `admin` schema (admin accounts and sessions).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
