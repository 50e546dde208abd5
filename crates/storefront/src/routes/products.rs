//! Product detail and favorite handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nexura_core::catalog::RatingBar;
use nexura_core::{Product, ProductId, Review};

use crate::db::UserDocumentRepository;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth, set_flash};
use crate::models::Flash;
use crate::routes::catalog::{SectionLink, section_links};
use crate::routes::{Layout, load_favorites, load_user};
use crate::state::AppState;

/// Images for one color variant.
#[derive(Clone)]
pub struct ColorView {
    pub name: String,
    pub images: Vec<String>,
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub discounted_price: Option<String>,
    pub discount: String,
    pub default_image: Option<String>,
    pub colors: Vec<ColorView>,
    pub sizes: Vec<String>,
    pub features: Vec<String>,
    pub average_rating: String,
    pub rating_count: u64,
    pub rating_bars: Vec<RatingBar>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        let discounted = product.discounted_price();
        let summary = product.rating.summary();
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            discounted_price: (discounted != product.price).then(|| discounted.to_string()),
            discount: product.discount.trim().to_owned(),
            default_image: product.primary_image().map(String::from),
            colors: product
                .colors
                .iter()
                .map(|color| ColorView {
                    name: color.clone(),
                    images: product.images_for(color).to_vec(),
                })
                .collect(),
            sizes: product.sizes_or_default(),
            features: product.features.clone(),
            average_rating: format!("{:.1}", summary.average),
            rating_count: summary.total,
            rating_bars: product.rating.bars(),
        }
    }
}

/// Reviews page query. Pages are 1-based in URLs.
#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    pub page: Option<usize>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionLink>,
    pub product: ProductDetailView,
    pub reviews: Vec<Review>,
    pub page: usize,
    pub has_next_page: bool,
    pub favorite: bool,
}

/// Display a product.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
    Query(query): Query<ReviewsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let id = ProductId::new(id);
    let product = state
        .catalog()
        .product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_owned()))?;

    let page = query.page.unwrap_or(1).max(1);
    let (reviews, has_next_page) = product.reviews_page(page - 1);

    let favorite = load_favorites(&state, user.as_ref())
        .await
        .is_some_and(|favorites| favorites.contains(&id));

    Ok(ProductShowTemplate {
        layout: Layout::load(&session, user).await,
        sections: section_links(None),
        product: ProductDetailView::from(&product),
        reviews: reviews.to_vec(),
        page,
        has_next_page,
        favorite,
    })
}

/// Toggle a product in the signed-in user's favorites.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = ProductId::new(id);
    if state.catalog().product(&id).await?.is_none() {
        return Err(AppError::NotFound("product".to_owned()));
    }

    let mut doc = load_user(&state, &user).await?;
    let added = doc.favorites.toggle(&id);
    UserDocumentRepository::new(state.pool())
        .save_favorites(&user.id, &doc.favorites)
        .await?;

    add_breadcrumb(
        "favorites",
        if added { "added" } else { "removed" },
        Some(&[("product_id", id.as_str())]),
    );
    set_flash(
        &session,
        Flash::success(if added {
            "Added to favorites"
        } else {
            "Removed from favorites"
        }),
    )
    .await;

    Ok(Redirect::to(&format!("/products/{}", urlencoding::encode(id.as_str()))))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nexura_core::{Price, RatingHistogram};

    use super::*;

    #[test]
    fn test_detail_view_lists_color_images_and_default_sizes() {
        let mut product = Product {
            name: "Trail".to_owned(),
            price: Price::from_rupees(250),
            colors: vec!["red".to_owned(), "blue".to_owned()],
            rating: [("5", 2), ("4", 1)].into_iter().collect::<RatingHistogram>(),
            ..Product::default()
        };
        product
            .image_urls
            .insert("red".to_owned(), vec!["https://cdn.example/r1.jpg".to_owned()]);

        let view = ProductDetailView::from(&product);
        assert_eq!(view.colors.len(), 2);
        assert_eq!(view.colors[0].images, vec!["https://cdn.example/r1.jpg"]);
        assert!(view.colors[1].images.is_empty());
        assert_eq!(view.sizes.len(), 9);
        assert_eq!(view.average_rating, "4.7");
        assert_eq!(view.rating_count, 3);
        assert!(view.discounted_price.is_none());
    }
}
