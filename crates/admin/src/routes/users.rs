//! Storefront user listing.

use askama::Template;
use axum::{extract::State, response::Html};
use tower_sessions::Session;
use tracing::instrument;

use nexura_core::UserDocument;

use crate::db::UserDocumentRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, take_flash};
use crate::routes::{Page, render};
use crate::state::AppState;

/// One row of the user table.
#[derive(Debug, Clone)]
pub struct UserRowView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_pic: String,
    pub total_orders: usize,
    pub joined: String,
}

impl From<&UserDocument> for UserRowView {
    fn from(user: &UserDocument) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.display_name().to_owned(),
            email: user.email.clone(),
            profile_pic: user.profile_pic.clone(),
            total_orders: user.orders.len(),
            joined: user
                .created_at
                .map(|t| t.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
        }
    }
}

/// User list template.
#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub page: Page,
    pub users: Vec<UserRowView>,
}

/// List every storefront user.
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let users = UserDocumentRepository::new(state.pool()).list().await?;

    Ok(render(&UsersIndexTemplate {
        page: Page::new(&admin, "/users", take_flash(&session).await),
        users: users.iter().map(UserRowView::from).collect(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use nexura_core::UserId;

    use super::*;

    #[test]
    fn test_user_row() {
        let now = Utc.with_ymd_and_hms(2024, 1, 9, 12, 0, 0).unwrap();
        let user = UserDocument::new(UserId::new("u1"), "", "meera@nexura.in", "", now);
        let row = UserRowView::from(&user);
        assert_eq!(row.name, "meera");
        assert_eq!(row.total_orders, 0);
        assert_eq!(row.joined, "09/01/2024");
    }
}
