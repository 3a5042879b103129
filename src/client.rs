use reqwest::{header, Method, Response, StatusCode};
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::{TaskCreate, TaskUpdate, TaskWire};
use crate::session::{Session, StoredToken};

/// Fallback backend address when `TASKFLOW_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Where the backend lives.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    /// Reads the backend base URL from `TASKFLOW_API_URL`.
    pub fn from_env() -> ApiConfig {
        let base_url = std::env::var("TASKFLOW_API_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        ApiConfig::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> ApiConfig {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        ApiConfig { base_url }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// HTTP client for the TaskFlow backend.
///
/// Attaches the session's bearer token to every request. A 401 response
/// triggers exactly one token refresh followed by one resend of the
/// original request; if either step fails the stored token is cleared and
/// the caller sees [`ApiError::AuthExpired`]. Any other failure status is
/// mapped to [`ApiError::Server`] with the body's `detail` message when
/// present. Transport errors propagate unmodified.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: Session) -> ApiClient {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: config.base_url,
            session,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Clears the stored token, ending the session.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.session.clear()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── Auth endpoints (unauthenticated) ──────────────────────────────

    /// Exchanges credentials for a bearer token and persists it.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        let token = self.obtain_token("/api/auth/login", email, password).await?;
        self.session.store(token)
    }

    /// Registers a new account; the backend logs the user straight in.
    pub async fn signup(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        let token = self.obtain_token("/api/auth/signup", email, password).await?;
        self.session.store(token)
    }

    async fn obtain_token(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<StoredToken, ApiError> {
        let resp = self
            .http
            .post(self.url(path))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        Ok(resp.json::<StoredToken>().await?)
    }

    /// Trades the current (possibly expired) token for a fresh one.
    ///
    /// Returns `false` on any failure; the caller decides what to do with
    /// the session.
    async fn refresh(&mut self) -> bool {
        let Some(token) = self.session.token().map(str::to_string) else {
            return false;
        };
        let result = self
            .http
            .post(self.url("/api/auth/refresh"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await;
        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("token refresh failed: {e}");
                return false;
            }
        };
        if !resp.status().is_success() {
            tracing::warn!("token refresh rejected with status {}", resp.status());
            return false;
        }
        match resp.json::<StoredToken>().await {
            Ok(token) => self.session.store(token).is_ok(),
            Err(e) => {
                tracing::warn!("token refresh returned malformed body: {e}");
                false
            }
        }
    }

    // ── Authenticated request path ────────────────────────────────────

    async fn execute(
        &self,
        method: &Method,
        url: &str,
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> Result<Response, ApiError> {
        let mut req = self
            .http
            .request(method.clone(), url)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(req.send().await?)
    }

    /// Sends an authenticated request, refreshing the token and retrying
    /// once on 401. Non-401 responses are returned as-is.
    async fn send(
        &mut self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        let Some(token) = self.session.token().map(str::to_string) else {
            return Err(ApiError::AuthExpired);
        };

        tracing::debug!(%method, %url, "sending request");
        let resp = self.execute(&method, &url, body.as_ref(), &token).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        tracing::debug!(%url, "got 401, attempting token refresh");
        if !self.refresh().await {
            self.session.clear()?;
            return Err(ApiError::AuthExpired);
        }
        let Some(token) = self.session.token().map(str::to_string) else {
            return Err(ApiError::AuthExpired);
        };
        let retry = self.execute(&method, &url, body.as_ref(), &token).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            self.session.clear()?;
            return Err(ApiError::AuthExpired);
        }
        Ok(retry)
    }

    // ── Task endpoints ────────────────────────────────────────────────

    pub async fn get_tasks(&mut self, completed: Option<bool>) -> Result<Vec<TaskWire>, ApiError> {
        let path = match completed {
            Some(c) => format!("/api/tasks/?completed={c}"),
            None => "/api/tasks/".to_string(),
        };
        let resp = self.send(Method::GET, &path, None).await?;
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        Ok(resp.json().await?)
    }

    pub async fn create_task(&mut self, task: &TaskCreate) -> Result<TaskWire, ApiError> {
        let body = serde_json::to_value(task)?;
        let resp = self.send(Method::POST, "/api/tasks/", Some(body)).await?;
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        Ok(resp.json().await?)
    }

    pub async fn get_task(&mut self, id: i64) -> Result<TaskWire, ApiError> {
        let resp = self
            .send(Method::GET, &format!("/api/tasks/{id}"), None)
            .await?;
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        Ok(resp.json().await?)
    }

    pub async fn update_task(&mut self, id: i64, update: &TaskUpdate) -> Result<TaskWire, ApiError> {
        let body = serde_json::to_value(update)?;
        let resp = self
            .send(Method::PUT, &format!("/api/tasks/{id}"), Some(body))
            .await?;
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        Ok(resp.json().await?)
    }

    pub async fn delete_task(&mut self, id: i64) -> Result<(), ApiError> {
        let resp = self
            .send(Method::DELETE, &format!("/api/tasks/{id}"), None)
            .await?;
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        Ok(())
    }
}

/// Maps a failure response to [`ApiError::Server`], preferring the
/// backend's `detail` message.
async fn error_from(resp: Response) -> ApiError {
    let status = resp.status().as_u16();
    let detail = match resp.json::<ErrorBody>().await {
        Ok(body) => body.detail,
        Err(_) => "request failed".to_string(),
    };
    ApiError::Server { status, detail }
}
