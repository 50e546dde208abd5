//! Integration tests for Nexura.
//!
//! The tests drive running binaries over HTTP and are `#[ignore]`d so a
//! plain `cargo test` stays offline.
//!
//! # Running Tests
//!
//! ```bash
//! nx-cli migrate all
//! cargo run -p nexura-storefront &
//! cargo run -p nexura-admin &
//! cargo test -p nexura-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_URL` - Storefront base URL (default: <http://localhost:3000>)
//! - `ADMIN_URL` - Admin base URL (default: <http://localhost:3001>)
//! - `ADMIN_TEST_EMAIL`, `ADMIN_TEST_PASSWORD` - An admin account created
//!   with `nx-cli admin create`; admin tests that need a session skip
//!   their signed-in half when unset

use reqwest::{Client, redirect::Policy};

/// Storefront base URL without a trailing slash.
#[must_use]
pub fn storefront_url() -> String {
    base_url("STOREFRONT_URL", "http://localhost:3000")
}

/// Admin base URL without a trailing slash.
#[must_use]
pub fn admin_url() -> String {
    base_url("ADMIN_URL", "http://localhost:3001")
}

fn base_url(key: &str, default: &str) -> String {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_owned())
        .trim_end_matches('/')
        .to_owned()
}

/// A client that keeps cookies and does not follow redirects, so tests can
/// assert on `Location`.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// The `Location` header of a response, if any.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// A unique throwaway email address.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.nexura.in", uuid::Uuid::new_v4().simple())
}
