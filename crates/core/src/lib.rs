//! Nexura Core - Shared domain library.
//!
//! This crate provides the types and calculations shared by all Nexura components:
//! - `storefront` - Public-facing shop
//! - `admin` - Administration console
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! Everything outside [`store`] and [`storage`] is pure: no I/O, no clocks
//! beyond explicit `now()` calls, no HTTP clients. The two backends are
//! feature-gated so the pure parts stay usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`catalog`] - Products, rating histograms, and catalog sections
//! - [`cart`] - Cart entries and cart mutations
//! - [`pricing`] - Cart pricing summary (discounts, pickup fee, tax)
//! - [`favorites`] - Favorite product toggling
//! - [`profile`] - Address and card validation
//! - [`order`] - Order records and checkout
//! - [`user`] - The user document
//! - [`store`] - `PostgreSQL` document store (feature `postgres`)
//! - [`storage`] - Filesystem blob store (feature `storage`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod favorites;
pub mod order;
pub mod pricing;
pub mod profile;
#[cfg(feature = "storage")]
pub mod storage;
#[cfg(feature = "postgres")]
pub mod store;
pub mod types;
pub mod user;

pub use cart::{Cart, CartEntry, MAX_QUANTITY};
pub use catalog::{Product, RatingHistogram, RatingSummary, Review, Section};
pub use favorites::Favorites;
pub use order::{CheckoutError, Order, PaymentMethod};
pub use pricing::{CartLine, CartSummary, Discount};
pub use profile::{Address, Card, ProfileError, SignupForm};
pub use types::*;
pub use user::UserDocument;
