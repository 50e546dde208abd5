//! Catalog seeding.
//!
//! Reads a YAML list of product documents (the stored camelCase shape) and
//! adds each one to the `products` collection under a new ID:
//!
//! ```yaml
//! - name: Trail Runner
//!   price: 2499
//!   categories: [Men, Running]
//!   colors: [Red, Blue]
//!   discount: "10%"
//!   sizes: ["41", "42", "43"]
//! ```

use std::path::Path;

use thiserror::Error;

use nexura_admin::db::{ProductRepository, RepositoryError, create_pool};
use nexura_core::Product;

use super::{CommandError, database_url};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Product #{index} is invalid: {reason}")]
    InvalidProduct { index: usize, reason: String },

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Parse and check a seed file's contents.
fn parse_products(content: &str) -> Result<Vec<Product>, SeedError> {
    let products: Vec<Product> = serde_yaml::from_str(content)?;
    for (index, product) in products.iter().enumerate() {
        if product.name.trim().is_empty() {
            return Err(SeedError::InvalidProduct {
                index: index + 1,
                reason: "name is required".to_owned(),
            });
        }
    }
    Ok(products)
}

/// Add the products in `file_path` to the catalog.
///
/// The whole file is validated before anything is written.
///
/// # Errors
///
/// Returns `SeedError` if the file is missing or malformed, or a write fails.
pub async fn products(file_path: &str) -> Result<usize, SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    tracing::info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse_products(&content)?;
    tracing::info!(products = products.len(), "Parsed seed file");

    let pool = create_pool(&database_url("ADMIN_DATABASE_URL")?).await?;
    let repo = ProductRepository::new(&pool);

    for product in &products {
        let id = repo.create(product).await?;
        tracing::info!(product_id = %id, name = %product.name, "Product added");
    }

    tracing::info!("Seeded {} products", products.len());
    Ok(products.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_products() {
        let yaml = r#"
- name: Trail Runner
  price: 2499.5
  categories: [Men, Running]
  colors: [Red]
  discount: "10%"
- name: Court Classic
  price: 1999
"#;
        let products = parse_products(yaml).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products.first().unwrap().colors, vec!["Red"]);
        assert!(products.get(1).unwrap().sizes.is_empty());
    }

    #[test]
    fn test_parse_products_requires_names() {
        let err = parse_products("- price: 10\n").unwrap_err();
        assert!(matches!(err, SeedError::InvalidProduct { index: 1, .. }));
    }
}
