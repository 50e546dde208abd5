//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Password sign-in for admin users
//! - `orders` - Orders flattened across user documents

pub mod auth;
pub mod orders;

pub use auth::{AdminAuthError, AdminAuthService, hash_password};
pub use orders::{AdminOrder, OrderBook};
