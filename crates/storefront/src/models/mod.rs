//! Domain models for the storefront.
//!
//! Product, user, and order shapes live in `nexura_core`; this module holds
//! the sign-in account and what the session carries.

pub mod account;
pub mod session;

pub use account::{Account, AuthProvider};
pub use session::{CurrentUser, Flash, FlashLevel, keys as session_keys};
