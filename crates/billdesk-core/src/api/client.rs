//! API client for the invoicing backend.
//!
//! The authority endpoints (`/auth/*`) are single-shot: callers decide on
//! retries. Data reads back off and retry on rate limiting.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Identity, Template, TemplateDraft, UnpaidBills};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Backend used when neither the config nor the environment names one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) data reads.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Successful sign-in: the opaque token and the user's profile.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: Identity,
}

/// Result of `GET /auth/check`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<Identity>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TemplateList {
    Bare(Vec<Template>),
    Wrapped { templates: Vec<Template> },
}

/// API client for the invoicing backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool
    /// and cookie jar.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: Response) -> Result<Option<Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self.request(Method::GET, path).send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Self::parse(response, path).await,
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(path = path, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    /// Single-shot request with a JSON body; the response body is discarded.
    async fn send_json<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<(), ApiError> {
        let response = self.request(method, path).json(body).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Authority =====

    /// Exchange email and password for a session token and profile
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, ApiError> {
        debug!(email = email, "Sending sign-in request");
        let response = self
            .request(Method::POST, "/auth/sign-in")
            .json(&SignInRequest { email, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse(response, "sign-in response").await
    }

    /// Ask the backend to end the session
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        let response = self.request(Method::POST, "/auth/sign-out").send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// Ask the backend whether the current cookie/token is a live session
    pub async fn check(&self) -> Result<CheckResponse, ApiError> {
        let response = self.request(Method::GET, "/auth/check").send().await?;
        let response = Self::check_response(response).await?;
        Self::parse(response, "session check").await
    }

    // ===== Templates =====

    pub async fn fetch_templates(&self) -> Result<Vec<Template>, ApiError> {
        let list: TemplateList = self.get("/templates").await?;
        Ok(match list {
            TemplateList::Bare(templates) => templates,
            TemplateList::Wrapped { templates } => templates,
        })
    }

    pub async fn fetch_template(&self, id: i64) -> Result<Template, ApiError> {
        self.get(&format!("/templates/{}", id)).await
    }

    pub async fn create_template(&self, draft: &TemplateDraft) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/templates/post", draft).await
    }

    pub async fn update_template(&self, id: i64, draft: &TemplateDraft) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &format!("/templates/{}", id), draft).await
    }

    // ===== Bills =====

    /// Unpaid bills grouped by company, with totals
    pub async fn fetch_unpaid_grouped(&self) -> Result<UnpaidBills, ApiError> {
        self.get("/bills/unpaid-bills-grouped").await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(DEFAULT_TIMEOUT_SECS)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = client("http://localhost:3000/api/");
        assert_eq!(api.base_url(), "http://localhost:3000/api");
        assert_eq!(api.url("/auth/check"), "http://localhost:3000/api/auth/check");
    }

    #[test]
    fn test_with_token_keeps_base_url() {
        let api = client(DEFAULT_BASE_URL);
        let authed = api.with_token(Some("abc".to_string()));
        assert_eq!(authed.token.as_deref(), Some("abc"));
        assert_eq!(authed.base_url(), DEFAULT_BASE_URL);
        assert!(api.token.is_none());
    }

    #[test]
    fn test_template_list_shapes() {
        let bare: TemplateList = serde_json::from_str(r#"[{"id": 1, "name": "A"}]"#).unwrap();
        assert!(matches!(bare, TemplateList::Bare(ref t) if t.len() == 1));

        let wrapped: TemplateList =
            serde_json::from_str(r#"{"templates": [{"id": 1}, {"id": 2}]}"#).unwrap();
        assert!(matches!(wrapped, TemplateList::Wrapped { ref templates } if templates.len() == 2));
    }

    #[test]
    fn test_check_response_defaults() {
        let check: CheckResponse = serde_json::from_str("{}").unwrap();
        assert!(!check.authenticated);
        assert!(check.user.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let api = ApiClient::new("http://127.0.0.1:1/api", Duration::from_secs(2)).unwrap();
        let err = api.check().await.unwrap_err();
        assert!(err.is_transport());
    }
}
