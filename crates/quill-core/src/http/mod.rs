//! Cookie-carrying JSON client for the notes backend.
//!
//! Every request goes through [`ApiClient::execute`], which forces a JSON
//! content type, sends the session cookies, and turns non-2xx responses
//! into [`Error::Request`]. A 401 triggers a single session refresh followed
//! by a single retry of the original request.

mod failure;

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

pub use failure::{describe_failure, is_json_content_type};

/// Session refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "api/auth/refresh/";

const JSON_CONTENT_TYPE: &str = "application/json";

/// One logical call against the backend.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    #[must_use]
    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a caller header. Applied after the forced JSON content type, so a
    /// caller value for the same key replaces it.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A request plus its spent/unspent refresh budget.
#[derive(Debug, Clone, Copy)]
struct RequestAttempt<'a> {
    request: &'a ApiRequest,
    refresh_attempted: bool,
}

impl<'a> RequestAttempt<'a> {
    const fn first(request: &'a ApiRequest) -> Self {
        Self {
            request,
            refresh_attempted: false,
        }
    }

    const fn retry(self) -> Self {
        Self {
            request: self.request,
            refresh_attempted: true,
        }
    }

    fn may_refresh(&self, status: StatusCode) -> bool {
        status == StatusCode::UNAUTHORIZED
            && !self.refresh_attempted
            && !is_refresh_path(&self.request.path)
    }
}

/// HTTP client bound to one backend base URL and one cookie jar.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    cookie_url: Url,
    client: Client,
    cookies: Arc<Jar>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        let cookie_url = Url::parse(&format!("{base_url}/")).map_err(|error| {
            Error::Config(format!("Invalid API base URL '{base_url}': {error}"))
        })?;
        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            base_url,
            cookie_url,
            client,
            cookies,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `path` onto the base URL. Paths that already start with `http`
    /// are used as-is.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }
        let relative = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", self.base_url, relative)
    }

    /// Cookies the jar would send to the backend, as a `Cookie` header value.
    pub fn cookie_header(&self) -> Option<String> {
        self.cookies
            .cookies(&self.cookie_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Seed the jar from a previously exported `Cookie` header value.
    pub fn restore_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim) {
            if !pair.is_empty() {
                self.cookies.add_cookie_str(pair, &self.cookie_url);
            }
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        self.execute(&request).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: HeaderMap,
    ) -> Result<Option<Value>> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        request.headers = headers;
        self.execute(&request).await
    }

    /// Send `request`, refreshing the session and retrying once on a 401.
    ///
    /// Returns the parsed body for JSON responses and `None` for any other
    /// successful response.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Option<Value>> {
        let mut attempt = RequestAttempt::first(request);
        loop {
            let response = self.send(attempt.request).await?;
            let status = response.status();
            if status.is_success() {
                return read_success_body(response).await;
            }

            if attempt.may_refresh(status) && self.refresh_session().await {
                tracing::debug!(path = %request.path, "retrying request after session refresh");
                attempt = attempt.retry();
                continue;
            }

            return Err(request_error(response).await);
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        decode(self.request(Method::GET, path, None).await?)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        decode(self.request(Method::POST, path, Some(body)).await?)
    }

    /// POST with an empty JSON object as the body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let body = Value::Object(serde_json::Map::new());
        decode(self.request(Method::POST, path, Some(body)).await?)
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        decode(self.request(Method::PATCH, path, Some(body)).await?)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        decode(self.request(Method::DELETE, path, None).await?)
    }

    async fn send(&self, request: &ApiRequest) -> Result<Response> {
        let url = self.resolve_url(&request.path);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        for (name, value) in &request.headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        tracing::debug!(method = %request.method, %url, "sending request");
        Ok(builder.send().await?)
    }

    /// POST to the refresh endpoint; true when the backend accepted it.
    async fn refresh_session(&self) -> bool {
        let url = self.resolve_url(REFRESH_PATH);
        let result = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("session refreshed");
                true
            }
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), "session refresh rejected");
                false
            }
            Err(error) => {
                tracing::warn!("Session refresh failed: {}", error);
                false
            }
        }
    }
}

/// Whether `path` targets the refresh endpoint, with or without a leading
/// slash or a prefix.
pub fn is_refresh_path(path: &str) -> bool {
    let normalized = path.strip_prefix('/').unwrap_or(path);
    normalized == REFRESH_PATH || normalized.ends_with(&format!("/{REFRESH_PATH}"))
}

fn decode<T: DeserializeOwned>(value: Option<Value>) -> Result<Option<T>> {
    value
        .map(serde_json::from_value)
        .transpose()
        .map_err(Into::into)
}

fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn read_success_body(response: Response) -> Result<Option<Value>> {
    if !is_json_content_type(content_type(&response).as_deref()) {
        return Ok(None);
    }
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&bytes)?))
}

async fn request_error(response: Response) -> Error {
    let status = response.status();
    let content_type = content_type(&response);
    let body = response.bytes().await.unwrap_or_default();
    let message = describe_failure(status.as_u16(), content_type.as_deref(), &body);
    tracing::debug!(status = status.as_u16(), %message, "request failed");
    Error::Request {
        status: status.as_u16(),
        message,
    }
}
