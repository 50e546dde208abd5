//! Domain models for admin.

pub mod admin_user;
pub mod session;

pub use admin_user::AdminUser;
pub use nexura_core::AdminRole;
pub use session::{CurrentAdmin, Flash, FlashLevel, keys as session_keys};
