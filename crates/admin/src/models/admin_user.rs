//! Admin user models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexura_core::{AdminRole, AdminUserId, Email};

/// An admin user (separate from storefront accounts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
