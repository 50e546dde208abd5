//! `PostgreSQL`-backed document store.
//!
//! Every record lives in one table keyed by `(collection, id)` with its body
//! in a JSONB column:
//!
//! ```sql
//! CREATE TABLE documents (
//!     collection TEXT NOT NULL,
//!     id         TEXT NOT NULL,
//!     data       JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (collection, id)
//! );
//! ```
//!
//! Writes replace a whole document or a whole top-level field. There is no
//! version column, so two writers doing read-modify-write on the same
//! document can lose one of the updates.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use sqlx::types::Json;
use thiserror::Error;

/// Document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Users,
}

impl Collection {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Users => "users",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document {collection}/{id} has an unexpected shape: {source}")]
    Corrupt {
        collection: Collection,
        id: String,
        source: serde_json::Error,
    },

    #[error("could not encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("document {collection}/{id} not found")]
    NotFound { collection: Collection, id: String },
}

/// Document store bound to a connection pool.
pub struct DocumentStore<'a> {
    pool: &'a PgPool,
}

impl<'a> DocumentStore<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Read one document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails and
    /// `StoreError::Corrupt` if the body does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT data FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection.as_str())
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(|(data,)| decode(collection, id, data)).transpose()
    }

    /// Read every document in a collection, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails and
    /// `StoreError::Corrupt` if any body does not decode as `T`.
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<(String, T)>, StoreError> {
        let rows: Vec<(String, serde_json::Value)> = sqlx::query_as(
            "SELECT id, data FROM documents WHERE collection = $1 ORDER BY created_at, id",
        )
        .bind(collection.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, data)| {
                let doc = decode(collection, &id, data)?;
                Ok((id, doc))
            })
            .collect()
    }

    /// Number of documents in a collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn count(&self, collection: Collection) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection.as_str())
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Create or replace a document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Encode` or `StoreError::Database`.
    pub async fn set<T: Serialize + Sync>(
        &self,
        collection: Collection,
        id: &str,
        doc: &T,
    ) -> Result<(), StoreError> {
        let data = serde_json::to_value(doc)?;
        sqlx::query(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(data))
        .execute(self.pool)
        .await?;

        tracing::debug!(%collection, id, "document written");
        Ok(())
    }

    /// Create a document only if it does not already exist.
    ///
    /// Returns `true` when the document was created.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Encode` or `StoreError::Database`.
    pub async fn create_if_absent<T: Serialize + Sync>(
        &self,
        collection: Collection,
        id: &str,
        doc: &T,
    ) -> Result<bool, StoreError> {
        let data = serde_json::to_value(doc)?;
        let result = sqlx::query(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(data))
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Create a document under a generated ID and return the ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Encode` or `StoreError::Database`.
    pub async fn add<T: Serialize + Sync>(
        &self,
        collection: Collection,
        doc: &T,
    ) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.set(collection, &id, doc).await?;
        Ok(id)
    }

    /// Overwrite one top-level field of an existing document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the document does not exist, plus
    /// `StoreError::Encode` or `StoreError::Database`.
    pub async fn update_field<T: Serialize + Sync>(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)?;
        let result = sqlx::query(
            r"
            UPDATE documents
            SET data = jsonb_set(data, ARRAY[$3], $4, true), updated_at = NOW()
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(field)
        .bind(Json(value))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_owned(),
            });
        }

        tracing::debug!(%collection, id, field, "document field written");
        Ok(())
    }

    /// Delete a document. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn decode<T: DeserializeOwned>(
    collection: Collection,
    id: &str,
    data: serde_json::Value,
) -> Result<T, StoreError> {
    serde_json::from_value(data).map_err(|source| StoreError::Corrupt {
        collection,
        id: id.to_owned(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Products.as_str(), "products");
        assert_eq!(Collection::Users.to_string(), "users");
    }

    #[test]
    fn test_decode_reports_location() {
        let err = decode::<Product>(Collection::Products, "p1", serde_json::json!({"price": "x"}))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("products/p1"), "{message}");
    }
}
