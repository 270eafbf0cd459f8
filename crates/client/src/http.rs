//! REST implementation of the catalog and sign-in seams.
//!
//! | operation         | request                       |
//! |-------------------|-------------------------------|
//! | list              | `GET    /api/products`        |
//! | get               | `GET    /api/products/{id}`   |
//! | create            | `POST   /api/products`        |
//! | update            | `PUT    /api/products/{id}`   |
//! | delete            | `DELETE /api/products/{id}`   |
//! | list_categories   | `GET    /api/categories`      |
//! | login             | `POST   /api/auth/login`      |

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use flogin_core::ProductId;
use flogin_products::{Category, Product, ProductInput};

use crate::config::ClientConfig;
use crate::login::{AuthError, AuthGateway, AuthToken, Credentials, LOGIN_REJECTED_MESSAGE};
use crate::remote::{CatalogError, RemoteCatalog};

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

impl HttpCatalog {
    /// Client with the default timeout and no token.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            token: config.auth_token.clone(),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, CatalogError> {
        let resp = self
            .authorized(req)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = error_text(resp).await;
        tracing::debug!(status = status.as_u16(), %message, "catalog request rejected");
        Err(match status {
            StatusCode::NOT_FOUND => CatalogError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => CatalogError::Validation(message),
            other => CatalogError::Server(other.as_u16(), message),
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, CatalogError> {
        let resp = self.send(req).await?;
        resp.json().await.map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Error bodies are plain text, or occasionally `{"message": ...}`.
async fn error_text(resp: Response) -> String {
    let body = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<MessageBody>(&body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl RemoteCatalog for HttpCatalog {
    async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        self.fetch(self.client.get(self.url("/api/products"))).await
    }

    async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.fetch(self.client.get(self.url(&format!("/api/products/{id}"))))
            .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.fetch(self.client.get(self.url("/api/categories"))).await
    }

    async fn create(&self, input: &ProductInput) -> Result<Product, CatalogError> {
        self.fetch(self.client.post(self.url("/api/products")).json(input))
            .await
    }

    async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product, CatalogError> {
        self.fetch(
            self.client
                .put(self.url(&format!("/api/products/{id}")))
                .json(input),
        )
        .await
    }

    async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        self.send(self.client.delete(self.url(&format!("/api/products/{id}"))))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl AuthGateway for HttpCatalog {
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, AuthError> {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(credentials)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            let body: LoginResponse = resp
                .json()
                .await
                .map_err(|e| AuthError::Decode(e.to_string()))?;

            return match body.token.filter(|t| !t.is_empty()) {
                Some(token) if status.is_success() => Ok(AuthToken::new(token)),
                _ => Err(AuthError::Rejected(
                    body.message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| LOGIN_REJECTED_MESSAGE.to_string()),
                )),
            };
        }

        Err(AuthError::Server(status.as_u16(), error_text(resp).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn base_url_is_normalised() {
        let catalog = HttpCatalog::new("http://localhost:8080/");
        assert_eq!(catalog.base_url(), "http://localhost:8080");
        assert_eq!(catalog.url("/api/products"), "http://localhost:8080/api/products");
    }

    #[test]
    fn from_config_carries_token() {
        let config = ClientConfig {
            timeout: Duration::from_secs(2),
            ..ClientConfig::default()
        }
        .with_token("abc");
        let catalog = HttpCatalog::from_config(&config).unwrap();
        assert_eq!(catalog.token.as_deref(), Some("abc"));
    }

    #[test]
    fn login_response_tolerates_missing_token() {
        let body: LoginResponse =
            serde_json::from_str(r#"{"message":"Sai tên tài khoản hoặc mật khẩu!","token":null}"#).unwrap();
        assert!(body.token.is_none());
        assert_eq!(body.message.as_deref(), Some("Sai tên tài khoản hoặc mật khẩu!"));
    }
}
