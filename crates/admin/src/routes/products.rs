//! Product management route handlers.
//!
//! Create and edit forms post `multipart/form-data`. Text fields carry the
//! product data (list fields comma-separated); file fields carry images:
//!
//! - `default_image`: the listing image
//! - `images:{color}`: images for one color, repeatable
//!
//! Images are written to blob storage before the document is saved, so a
//! failed write never leaves a product pointing at a missing file.

use std::collections::BTreeMap;

use askama::Template;
use axum::{
    Form,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nexura_core::catalog::{split_list, unique_colors};
use nexura_core::storage::{BlobError, product_color_image_path, product_default_image_path};
use nexura_core::{Price, Product, ProductId};

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, RequireWriteAccess, set_flash, take_flash};
use crate::models::{CurrentAdmin, Flash};
use crate::routes::{Page, render};
use crate::state::AppState;

/// Prefix of per-color image fields.
const COLOR_IMAGE_FIELD_PREFIX: &str = "images:";

// =============================================================================
// Form parsing
// =============================================================================

/// An uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Parsed product form.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub categories: String,
    pub colors: String,
    pub discount: String,
    pub features: String,
    pub sizes: String,
    pub description: String,
    pub default_image: Option<Upload>,
    /// `(color, file)` pairs in upload order.
    pub color_images: Vec<(String, Upload)>,
}

impl ProductForm {
    /// Read every field of a multipart body. Unknown fields and empty file
    /// inputs are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Multipart` if the body is malformed.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_owned) {
                let bytes = field.bytes().await?;
                if file_name.is_empty() || bytes.is_empty() {
                    continue;
                }
                let upload = Upload { file_name, bytes };
                if name == "default_image" {
                    form.default_image = Some(upload);
                } else if let Some(color) = name.strip_prefix(COLOR_IMAGE_FIELD_PREFIX) {
                    form.color_images.push((color.trim().to_owned(), upload));
                }
                continue;
            }

            let value = field.text().await?;
            match name.as_str() {
                "name" => form.name = value,
                "price" => form.price = value,
                "categories" => form.categories = value,
                "colors" => form.colors = value,
                "discount" => form.discount = value,
                "features" => form.features = value,
                "sizes" => form.sizes = value,
                "description" => form.description = value,
                _ => {}
            }
        }

        Ok(form)
    }

    /// Pre-filled form for an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.amount().to_string(),
            categories: product.categories.join(", "),
            colors: product.colors.join(", "),
            discount: product.discount.clone(),
            features: product.features.join(", "),
            sizes: product.sizes.join(", "),
            description: product.description.clone(),
            ..Self::default()
        }
    }

    /// Copy the text fields onto `product`.
    ///
    /// Images, reviews and ratings are left alone. Image lists of colors
    /// dropped from the form are kept until their images are deleted.
    ///
    /// # Errors
    ///
    /// Returns a message for the form when the name is blank or the price
    /// does not parse.
    pub fn apply(&self, product: &mut Product) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_owned());
        }
        let price = Price::parse(&self.price).ok_or("Price must be a non-negative number")?;

        name.clone_into(&mut product.name);
        product.price = price;
        product.categories = split_list(&self.categories);
        product.colors = unique_colors(split_list(&self.colors));
        self.discount.trim().clone_into(&mut product.discount);
        product.features = split_list(&self.features);
        product.sizes = split_list(&self.sizes);
        self.description.trim().clone_into(&mut product.description);
        Ok(())
    }

    /// Whether the form carries any image.
    #[must_use]
    pub fn has_uploads(&self) -> bool {
        self.default_image.is_some() || !self.color_images.is_empty()
    }
}

/// Write the form's images to blob storage and record their URLs.
///
/// Uploading a file name that already exists for the product overwrites
/// the blob and keeps a single URL entry.
async fn store_uploads(
    state: &AppState,
    product: &mut Product,
    form: &ProductForm,
) -> Result<usize, BlobError> {
    let blobs = state.blobs();
    let mut stored = 0;

    if let Some(upload) = &form.default_image {
        let path = product_default_image_path(&product.name, &upload.file_name);
        product.default_image = blobs.upload(&path, &upload.bytes).await?;
        stored += 1;
    }

    for (color, upload) in &form.color_images {
        if !product.colors.iter().any(|c| c == color) {
            tracing::warn!(color = %color, "Skipping image for unknown color");
            continue;
        }
        let path = product_color_image_path(&product.name, color, &upload.file_name);
        let url = blobs.upload(&path, &upload.bytes).await?;
        let urls = product.image_urls.entry(color.clone()).or_default();
        if !urls.contains(&url) {
            urls.push(url);
        }
        stored += 1;
    }

    Ok(stored)
}

// =============================================================================
// Views
// =============================================================================

/// One row of the product table.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub discounted_price: Option<String>,
    pub categories: String,
    pub colors: String,
    pub image: Option<String>,
    pub review_count: usize,
}

impl From<&Product> for ProductRowView {
    fn from(product: &Product) -> Self {
        let discounted = product.discounted_price();
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.to_string(),
            discounted_price: (discounted != product.price).then(|| discounted.to_string()),
            categories: product.categories.join(", "),
            colors: product.colors.join(", "),
            image: product.primary_image().map(str::to_owned),
            review_count: product.reviews.len(),
        }
    }
}

/// Images of one color on the edit form.
#[derive(Debug, Clone)]
pub struct ColorImagesView {
    pub color: String,
    pub urls: Vec<String>,
    /// Still listed in the product's colors, so new uploads are accepted.
    pub active: bool,
}

fn color_images(product: &Product) -> Vec<ColorImagesView> {
    let mut groups: BTreeMap<&str, ColorImagesView> = BTreeMap::new();
    for color in &product.colors {
        groups.insert(
            color,
            ColorImagesView {
                color: color.clone(),
                urls: product.images_for(color).to_vec(),
                active: true,
            },
        );
    }
    for (color, urls) in &product.image_urls {
        if !urls.is_empty() && !groups.contains_key(color.as_str()) {
            groups.insert(
                color,
                ColorImagesView {
                    color: color.clone(),
                    urls: urls.clone(),
                    active: false,
                },
            );
        }
    }
    let mut ordered: Vec<ColorImagesView> = Vec::with_capacity(groups.len());
    for color in &product.colors {
        if let Some(group) = groups.remove(color.as_str()) {
            ordered.push(group);
        }
    }
    ordered.extend(groups.into_values());
    ordered
}

/// Product list template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: Page,
    pub products: Vec<ProductRowView>,
}

/// Create and edit form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub page: Page,
    /// `None` when creating.
    pub product_id: Option<String>,
    pub form: ProductForm,
    pub default_image: Option<String>,
    pub color_images: Vec<ColorImagesView>,
    pub error: Option<String>,
}

impl ProductFormTemplate {
    fn new_product(admin: &CurrentAdmin, form: ProductForm, error: Option<String>) -> Self {
        Self {
            page: Page::new(admin, "/products", None),
            product_id: None,
            form,
            default_image: None,
            color_images: Vec::new(),
            error,
        }
    }

    fn edit(
        page: Page,
        product: &Product,
        form: ProductForm,
        error: Option<String>,
    ) -> Self {
        Self {
            page,
            product_id: Some(product.id.to_string()),
            form,
            default_image: (!product.default_image.is_empty())
                .then(|| product.default_image.clone()),
            color_images: color_images(product),
            error,
        }
    }

    fn action(&self) -> String {
        self.product_id.as_ref().map_or_else(
            || "/products/new".to_owned(),
            |id| format!("/products/{}/edit", urlencoding::encode(id)),
        )
    }
}

fn invalid_form(template: &ProductFormTemplate) -> Response {
    (StatusCode::BAD_REQUEST, render(template)).into_response()
}

async fn load_product(state: &AppState, id: &ProductId) -> Result<Product, AppError> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

// =============================================================================
// Handlers
// =============================================================================

/// Product list.
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let products = ProductRepository::new(state.pool()).list().await?;

    Ok(render(&ProductsIndexTemplate {
        page: Page::new(&admin, "/products", take_flash(&session).await),
        products: products.iter().map(ProductRowView::from).collect(),
    }))
}

/// Empty product form.
pub async fn new_page(RequireWriteAccess(admin): RequireWriteAccess) -> Html<String> {
    render(&ProductFormTemplate::new_product(
        &admin,
        ProductForm::default(),
        None,
    ))
}

/// Create a product and continue to its edit page for per-color images.
#[instrument(skip(admin, state, session, multipart), fields(admin = %admin.email))]
pub async fn create(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = ProductForm::from_multipart(multipart).await?;

    let mut product = Product::default();
    if let Err(message) = form.apply(&mut product) {
        let form = ProductForm {
            default_image: None,
            color_images: Vec::new(),
            ..form
        };
        return Ok(invalid_form(&ProductFormTemplate::new_product(
            &admin,
            form,
            Some(message),
        )));
    }

    let images = store_uploads(&state, &mut product, &form).await?;
    let id = ProductRepository::new(state.pool()).create(&product).await?;

    tracing::info!(product_id = %id, images, "Product created");
    set_flash(
        &session,
        Flash::success(format!("{} created. Add images for each color below.", product.name)),
    )
    .await;
    Ok(Redirect::to(&format!("/products/{}/edit", urlencoding::encode(id.as_str()))).into_response())
}

/// Edit form for an existing product.
#[instrument(skip(admin, state, session))]
pub async fn edit_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let product = load_product(&state, &ProductId::new(id)).await?;
    let page = Page::new(&admin, "/products", take_flash(&session).await);

    Ok(render(&ProductFormTemplate::edit(
        page,
        &product,
        ProductForm::from_product(&product),
        None,
    )))
}

/// Update a product's fields and add any uploaded images.
#[instrument(skip(admin, state, session, multipart), fields(admin = %admin.email))]
pub async fn update(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut product = load_product(&state, &ProductId::new(id)).await?;
    let form = ProductForm::from_multipart(multipart).await?;

    if let Err(message) = form.apply(&mut product) {
        let page = Page::new(&admin, "/products", None);
        let form = ProductForm {
            default_image: None,
            color_images: Vec::new(),
            ..form
        };
        return Ok(invalid_form(&ProductFormTemplate::edit(
            page,
            &product,
            form,
            Some(message),
        )));
    }

    let images = store_uploads(&state, &mut product, &form).await?;
    ProductRepository::new(state.pool()).save(&product).await?;

    tracing::info!(product_id = %product.id, images, "Product updated");
    let message = if form.has_uploads() {
        format!("{} saved with {images} new image(s)", product.name)
    } else {
        format!("{} saved", product.name)
    };
    set_flash(&session, Flash::success(message)).await;
    Ok(Redirect::to(&format!(
        "/products/{}/edit",
        urlencoding::encode(product.id.as_str())
    ))
    .into_response())
}

/// Form posted to delete one image.
#[derive(Debug, Deserialize)]
pub struct DeleteImageForm {
    pub url: String,
}

/// Delete one image from storage and from the product document.
#[instrument(skip(admin, state, session, form), fields(admin = %admin.email, url = %form.url))]
pub async fn delete_image(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<DeleteImageForm>,
) -> Result<Redirect, AppError> {
    let mut product = load_product(&state, &ProductId::new(id)).await?;

    if !product.remove_image(&form.url) {
        return Err(AppError::NotFound(format!("image {}", form.url)));
    }

    match state.blobs().path_from_url(&form.url) {
        Some(path) => match state.blobs().delete(&path).await {
            Ok(()) | Err(BlobError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        },
        None => tracing::warn!("Image URL is outside blob storage; removing reference only"),
    }

    ProductRepository::new(state.pool()).save(&product).await?;

    tracing::info!(product_id = %product.id, "Product image deleted");
    set_flash(&session, Flash::success("Image deleted")).await;
    Ok(Redirect::to(&format!(
        "/products/{}/edit",
        urlencoding::encode(product.id.as_str())
    )))
}

/// Delete a product document. Its images stay in storage.
#[instrument(skip(admin, state, session), fields(admin = %admin.email))]
pub async fn delete(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = ProductId::new(id);
    if !ProductRepository::new(state.pool()).delete(&id).await? {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    tracing::info!(product_id = %id, "Product deleted");
    set_flash(&session, Flash::success("Product deleted")).await;
    Ok(Redirect::to("/products"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "  Trail Runner ".to_owned(),
            price: "2499.50".to_owned(),
            categories: "Men, Running,".to_owned(),
            colors: "Red, Blue, Red, ".to_owned(),
            discount: " 10% ".to_owned(),
            features: "Breathable, Lightweight".to_owned(),
            sizes: "41, 42".to_owned(),
            description: "A shoe.".to_owned(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_apply_normalizes_fields() {
        let mut product = Product::default();
        form().apply(&mut product).unwrap();

        assert_eq!(product.name, "Trail Runner");
        assert_eq!(product.price, Price::parse("2499.5").unwrap());
        assert_eq!(product.categories, vec!["Men", "Running"]);
        assert_eq!(product.colors, vec!["Red", "Blue"]);
        assert_eq!(product.discount, "10%");
        assert_eq!(product.sizes, vec!["41", "42"]);
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut product = Product::default();

        let blank = ProductForm {
            name: "  ".to_owned(),
            ..form()
        };
        assert!(blank.apply(&mut product).is_err());

        let bad_price = ProductForm {
            price: "free".to_owned(),
            ..form()
        };
        assert_eq!(
            bad_price.apply(&mut product).unwrap_err(),
            "Price must be a non-negative number"
        );
        assert_eq!(product, Product::default());
    }

    #[test]
    fn test_apply_keeps_images_and_reviews() {
        let mut product = Product {
            colors: vec!["Green".to_owned()],
            default_image: "http://x/uploads/a.jpg".to_owned(),
            ..Product::default()
        };
        product
            .image_urls
            .insert("Green".to_owned(), vec!["http://x/uploads/g.jpg".to_owned()]);

        form().apply(&mut product).unwrap();
        assert_eq!(product.default_image, "http://x/uploads/a.jpg");
        assert_eq!(product.images_for("Green").len(), 1);

        // Dropped colors still show their images, marked inactive
        let groups = color_images(&product);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups.first().unwrap().color, "Red");
        assert!(!groups.get(2).unwrap().active);
    }

    #[test]
    fn test_from_product_round_trips_text() {
        let mut product = Product::default();
        form().apply(&mut product).unwrap();
        let prefilled = ProductForm::from_product(&product);
        assert_eq!(prefilled.colors, "Red, Blue");
        assert_eq!(prefilled.price, "2499.50");
        assert!(!prefilled.has_uploads());
    }

    #[test]
    fn test_row_view_shows_discount() {
        let mut product = Product::default();
        form().apply(&mut product).unwrap();
        let row = ProductRowView::from(&product);
        assert!(row.discounted_price.is_some());
        assert!(row.image.is_none());
    }
}
