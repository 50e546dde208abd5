//! OpenID Connect client for federated sign-in.
//!
//! # Flow
//!
//! 1. Generate an authorization URL with `authorization_url()`
//! 2. Redirect the shopper to the provider's consent page
//! 3. The provider redirects back with an authorization code
//! 4. Exchange the code for tokens with `exchange_code()`
//! 5. Fetch the shopper's identity with `userinfo()`

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::OidcConfig;

/// Errors talking to the identity provider.
#[derive(Debug, Error)]
pub enum FederatedError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("provider error: {0}")]
    Provider(String),
}

/// Raw token response from the provider's token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub id_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// The claims of the provider's userinfo endpoint that sign-in uses.
#[derive(Debug, Clone, Deserialize)]
pub struct FederatedIdentity {
    #[serde(rename = "sub")]
    pub subject: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

/// Client for an OpenID Connect provider.
#[derive(Clone)]
pub struct FederatedClient {
    inner: Arc<FederatedClientInner>,
}

struct FederatedClientInner {
    client: reqwest::Client,
    config: OidcConfig,
}

impl FederatedClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: OidcConfig) -> Self {
        Self {
            inner: Arc::new(FederatedClientInner {
                client: reqwest::Client::new(),
                config,
            }),
        }
    }

    /// The issuer URL accounts are linked under.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.inner.config.issuer
    }

    /// Generate the authorization URL.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - The callback URL to redirect to after authentication
    /// * `state` - A random string stored in the session to prevent CSRF attacks
    /// * `nonce` - A random string for replay protection
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String {
        format!(
            "{}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            state={}&\
            nonce={}",
            self.inner.config.authorize_url,
            urlencoding::encode(&self.inner.config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
            urlencoding::encode(nonce)
        )
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider rejects the code.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, FederatedError> {
        let config = &self.inner.config;
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(&config.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FederatedError::Provider(format!(
                "token exchange failed ({status}): {text}"
            )));
        }

        Ok(response.json().await?)
    }

    /// Fetch the signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, access_token))]
    pub async fn userinfo(&self, access_token: &str) -> Result<FederatedIdentity, FederatedError> {
        let response = self
            .inner
            .client
            .get(&self.inner.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(FederatedError::Provider(format!(
                "userinfo request failed ({status})"
            )));
        }

        Ok(response.json().await?)
    }
}

/// Read the `nonce` claim of an ID token.
///
/// The token comes straight from the token endpoint over TLS, so only the
/// payload is decoded; the signature is not checked.
#[must_use]
pub fn id_token_nonce(id_token: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Claims {
        nonce: Option<String>,
    }

    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<Claims>(&bytes).ok()?.nonce
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::GOOGLE_ISSUER;

    fn client() -> FederatedClient {
        FederatedClient::new(OidcConfig::for_issuer(
            GOOGLE_ISSUER,
            "client id".to_owned(),
            SecretString::from("s3cr3t"),
        ))
    }

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let url = client().authorization_url(
            "https://shop.nexura.in/auth/federated/callback",
            "st",
            "nc",
        );
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client%20id"));
        assert!(
            url.contains("redirect_uri=https%3A%2F%2Fshop.nexura.in%2Fauth%2Ffederated%2Fcallback")
        );
        assert!(url.contains("state=st"));
        assert!(url.contains("nonce=nc"));
        assert!(!url.contains("s3cr3t"));
    }

    #[test]
    fn test_identity_defaults_missing_claims() {
        let identity: FederatedIdentity =
            serde_json::from_value(serde_json::json!({"sub": "1234"})).unwrap();
        assert_eq!(identity.subject, "1234");
        assert!(!identity.email_verified);
        assert!(identity.picture.is_empty());
    }

    #[test]
    fn test_id_token_nonce() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"1","nonce":"abc123"}"#);
        let token = format!("eyJhbGciOiJSUzI1NiJ9.{payload}.c2ln");
        assert_eq!(id_token_nonce(&token).as_deref(), Some("abc123"));
        assert_eq!(id_token_nonce("not-a-jwt"), None);
    }
}
