//! Admin console HTTP tests.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`nx-cli migrate all`)
//! - The admin server running (`cargo run -p nexura-admin`)
//! - For signed-in tests, `ADMIN_TEST_EMAIL` and `ADMIN_TEST_PASSWORD`

#![allow(clippy::unwrap_used)]

use nexura_integration_tests::{admin_url, client, location, unique_email};
use reqwest::{Client, StatusCode};

/// Sign in with the test admin account, or `None` when it is not configured.
async fn signed_in_client() -> Option<Client> {
    let email = std::env::var("ADMIN_TEST_EMAIL").ok()?;
    let password = std::env::var("ADMIN_TEST_PASSWORD").ok()?;

    let client = client();
    let resp = client
        .post(format!("{}/auth/login", admin_url()))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection(), "admin login failed");
    assert_eq!(location(&resp).as_deref(), Some("/"));
    Some(client)
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_pages_require_sign_in() {
    let client = client();
    let base = admin_url();

    for path in ["/", "/products", "/orders", "/users", "/products/new"] {
        let resp = client.get(format!("{base}{path}")).send().await.unwrap();
        assert!(resp.status().is_redirection(), "{path}");
        assert_eq!(location(&resp).as_deref(), Some("/auth/login"), "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_admin_responses_are_not_cached() {
    let resp = client()
        .get(format!("{}/auth/login", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("x-frame-options")
            .and_then(|v| v.to_str().ok()),
        Some("DENY")
    );
    assert!(
        resp.headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("no-store"))
    );
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_bad_credentials_rerender_login() {
    let resp = client()
        .post(format!("{}/auth/login", admin_url()))
        .form(&[
            ("email", unique_email("intruder").as_str()),
            ("password", "definitely-wrong"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Invalid email or password"));
}

#[tokio::test]
#[ignore = "Requires running admin server and ADMIN_TEST_EMAIL/ADMIN_TEST_PASSWORD"]
async fn test_signed_in_pages_render() {
    let Some(client) = signed_in_client().await else {
        return;
    };
    let base = admin_url();

    for path in ["/", "/products", "/orders", "/users", "/orders?status=Cancelled"] {
        let resp = client.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server and ADMIN_TEST_EMAIL/ADMIN_TEST_PASSWORD"]
async fn test_product_lifecycle() {
    let Some(client) = signed_in_client().await else {
        return;
    };
    let base = admin_url();
    let name = format!("Test Shoe {}", uuid::Uuid::new_v4().simple());

    let form = reqwest::multipart::Form::new()
        .text("name", name.clone())
        .text("price", "1999")
        .text("categories", "Men, Sports")
        .text("colors", "Black")
        .text("discount", "10%")
        .text("sizes", "42, 43");
    let resp = client
        .post(format!("{base}/products/new"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection(), "{}", resp.status());
    let edit_path = location(&resp).unwrap();
    assert!(edit_path.ends_with("/edit"));

    let resp = client.get(format!("{base}{edit_path}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("images:Black"));

    let delete_path = edit_path.replace("/edit", "/delete");
    let resp = client
        .post(format!("{base}{delete_path}"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());

    let resp = client.get(format!("{base}{edit_path}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running admin server and ADMIN_TEST_EMAIL/ADMIN_TEST_PASSWORD"]
async fn test_invalid_price_is_rejected() {
    let Some(client) = signed_in_client().await else {
        return;
    };

    let form = reqwest::multipart::Form::new()
        .text("name", "Broken Shoe")
        .text("price", "free");
    let resp = client
        .post(format!("{}/products/new", admin_url()))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
