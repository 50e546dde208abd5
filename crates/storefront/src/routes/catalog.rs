//! Catalog listing handlers: the home page, section pages and favorites.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use nexura_core::{Favorites, Product, Section};

use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::routes::{Layout, load_favorites, load_user};
use crate::state::AppState;

/// Product tile shown in listings.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub discounted_price: Option<String>,
    pub discount: String,
    pub image: Option<String>,
    pub rating: String,
    pub favorite: bool,
}

impl ProductCardView {
    /// Build a tile, flagging it when it is among the shopper's favorites.
    #[must_use]
    pub fn new(product: &Product, favorites: Option<&Favorites>) -> Self {
        let discounted = product.discounted_price();
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.to_string(),
            discounted_price: (discounted != product.price).then(|| discounted.to_string()),
            discount: product.discount.trim().to_owned(),
            image: product.primary_image().map(String::from),
            rating: format!("{:.1}", product.rating.summary().average),
            favorite: favorites.is_some_and(|f| f.contains(&product.id)),
        }
    }
}

/// Section link in the navigation bar.
pub struct SectionLink {
    pub path: &'static str,
    pub title: &'static str,
    pub active: bool,
}

/// Links to every section, marking `current`.
#[must_use]
pub fn section_links(current: Option<Section>) -> Vec<SectionLink> {
    Section::ALL
        .iter()
        .map(|section| SectionLink {
            path: section.path(),
            title: section.title(),
            active: current == Some(*section),
        })
        .collect()
}

/// Section listing template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/section.html")]
pub struct SectionTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionLink>,
    pub title: &'static str,
    pub products: Vec<ProductCardView>,
}

/// Favorites listing template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/favorites.html")]
pub struct FavoritesTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionLink>,
    pub products: Vec<ProductCardView>,
}

/// Render one catalog section. Favorite flags are shown when signed in.
#[instrument(skip(state, session, user))]
async fn render_section(
    state: &AppState,
    session: &Session,
    user: Option<crate::models::CurrentUser>,
    section: Section,
) -> Result<SectionTemplate, AppError> {
    let products = state.catalog().products().await?;

    let favorites = load_favorites(state, user.as_ref()).await;

    let products = section
        .filter(&products)
        .into_iter()
        .map(|p| ProductCardView::new(p, favorites.as_ref()))
        .collect();

    Ok(SectionTemplate {
        layout: Layout::load(session, user).await,
        sections: section_links(Some(section)),
        title: section.title(),
        products,
    })
}

/// Display every product.
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    render_section(&state, &session, user, Section::All).await
}

/// Display the woman section.
pub async fn woman(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    render_section(&state, &session, user, Section::Woman).await
}

/// Display the man section.
pub async fn man(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    render_section(&state, &session, user, Section::Man).await
}

/// Display the kids section.
pub async fn kids(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    render_section(&state, &session, user, Section::Kids).await
}

/// Display the sports section.
pub async fn sports(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    render_section(&state, &session, user, Section::Sports).await
}

/// Display the sale section.
pub async fn sale(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    render_section(&state, &session, user, Section::Sale).await
}

/// Display the signed-in user's favorite products.
///
/// Favorites that point at deleted products are skipped.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn favorites(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let doc = load_user(&state, &user).await?;
    let products = state
        .catalog()
        .products_by_id(doc.favorites.as_slice())
        .await?
        .iter()
        .map(|p| ProductCardView::new(p, Some(&doc.favorites)))
        .collect();

    Ok(FavoritesTemplate {
        layout: Layout::load(&session, Some(user)).await,
        sections: section_links(None),
        products,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nexura_core::{Price, ProductId};

    use super::*;

    fn product() -> Product {
        Product {
            name: "Court Runner".to_owned(),
            price: Price::from_rupees(100),
            discount: "10%".to_owned(),
            default_image: "https://cdn.example/court.jpg".to_owned(),
            ..Product::default()
        }
        .with_id(ProductId::new("p1"))
    }

    #[test]
    fn test_card_shows_discounted_price() {
        let card = ProductCardView::new(&product(), None);
        assert_eq!(card.price, "₹100.00");
        assert_eq!(card.discounted_price.as_deref(), Some("₹90.00"));
        assert_eq!(card.image.as_deref(), Some("https://cdn.example/court.jpg"));
        assert!(!card.favorite);
    }

    #[test]
    fn test_card_flags_favorites() {
        let mut favorites = Favorites::default();
        favorites.toggle(&ProductId::new("p1"));
        assert!(ProductCardView::new(&product(), Some(&favorites)).favorite);
    }

    #[test]
    fn test_section_links_mark_current() {
        let links = section_links(Some(Section::Kids));
        assert_eq!(links.len(), 6);
        assert!(links.iter().filter(|l| l.active).all(|l| l.path == "/kids"));
        assert_eq!(links.iter().filter(|l| l.active).count(), 1);
    }
}
