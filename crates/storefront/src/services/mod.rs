//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Password registration and sign-in, federated account linking
//! - `federated` - OpenID Connect client for federated sign-in
//! - `catalog` - Cached product reads

pub mod auth;
pub mod catalog;
pub mod federated;

pub use auth::{AuthError, AuthService};
pub use catalog::CatalogService;
pub use federated::{FederatedClient, FederatedError, FederatedIdentity};
