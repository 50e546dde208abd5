//! Dashboard route handler.

use askama::Template;
use axum::{extract::State, response::Html};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{ProductRepository, UserDocumentRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, take_flash};
use crate::routes::orders::OrderRowView;
use crate::routes::{Page, render};
use crate::services::OrderBook;
use crate::state::AppState;

/// Orders shown under "Recent orders".
const RECENT_ORDERS: usize = 5;

/// Dashboard metrics.
#[derive(Debug, Clone, Default)]
pub struct DashboardMetrics {
    pub products: i64,
    pub users: usize,
    pub orders: usize,
}

/// Order count for one status.
#[derive(Debug, Clone)]
pub struct StatusCountView {
    pub status: &'static str,
    pub count: usize,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: Page,
    pub metrics: DashboardMetrics,
    pub status_counts: Vec<StatusCountView>,
    pub recent_orders: Vec<OrderRowView>,
}

/// Dashboard page handler.
#[instrument(skip(admin, state, session))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let users = UserDocumentRepository::new(state.pool()).list().await?;
    let products = ProductRepository::new(state.pool()).count().await?;
    let book = OrderBook::from_users(&users);

    let metrics = DashboardMetrics {
        products,
        users: users.len(),
        orders: book.len(),
    };

    let status_counts = book
        .status_counts()
        .into_iter()
        .map(|(status, count)| StatusCountView {
            status: status.as_str(),
            count,
        })
        .collect();

    let recent_orders = book
        .recent(RECENT_ORDERS)
        .into_iter()
        .map(OrderRowView::from)
        .collect();

    Ok(render(&DashboardTemplate {
        page: Page::new(&admin, "/", take_flash(&session).await),
        metrics,
        status_counts,
        recent_orders,
    }))
}
