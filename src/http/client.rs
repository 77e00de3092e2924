//! Authenticated HTTP client for the voting API

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::http::xsrf;
use crate::session::SessionStore;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Where the host application should navigate after the session expires
pub const SESSION_EXPIRED_REDIRECT: &str = "/";

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent unchanged
    Raw(String),
    /// Serialized to JSON before sending
    Json(Value),
}

/// Per-request options: verb, header overrides and body
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Applied after the computed defaults, so same-named headers replace them
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::default().method(Method::POST)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the verb from a string, case-insensitively
    pub fn method_str(self, method: &str) -> Result<Self> {
        Ok(self.method(parse_method(method)?))
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn raw(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }
}

/// Parses an HTTP verb ignoring case (`"post"` and `"POST"` are the same)
pub fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.trim().to_uppercase().as_bytes())
        .map_err(|e| ClientError::Config(format!("Invalid HTTP method '{method}': {e}")))
}

/// HTTP client that attaches the session credential and XSRF token to every
/// call and enforces the session-expiry policy on 401 responses
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    jar: Arc<Jar>,
    config: ClientConfig,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// Creates a client with a fresh cookie jar
    pub fn new(config: ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        Self::with_jar(config, session, Arc::new(Jar::default()))
    }

    /// Creates a client sharing an existing cookie jar
    pub fn with_jar(
        mut config: ClientConfig,
        session: Arc<dyn SessionStore>,
        jar: Arc<Jar>,
    ) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self {
            client,
            jar,
            config,
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The session store this client reads credentials from
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// The cookie jar shared by every request
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    /// Current decoded anti-forgery token, if the server has set one
    pub fn xsrf_token(&self) -> Option<String> {
        let api = Url::parse(&self.config.api_base_url).ok();
        let app = Url::parse(&self.config.app_base_url).ok();
        api.iter()
            .chain(app.iter())
            .find_map(|url| xsrf::token_for(self.jar.as_ref(), url))
    }

    /// Asks the server to set the XSRF cookie. Failures are logged, never returned.
    pub async fn prime_anti_forgery(&self) {
        let url = format!("{}{}", self.config.app_base_url, xsrf::CSRF_COOKIE_PATH);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("CSRF cookie primed ({})", response.status());
            }
            Ok(response) => {
                warn!("CSRF cookie request returned {}", response.status());
            }
            Err(e) => {
                error!("Failed to get CSRF cookie: {e}");
            }
        }
    }

    /// Sends a GET request and decodes the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(path, RequestOptions::get()).await
    }

    /// Sends a POST request with a JSON body and decodes the JSON response
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.request(path, RequestOptions::post().json(body)).await
    }

    /// Sends a request to `api_base_url + path`.
    ///
    /// Returns the decoded JSON body on 2xx. A 401 clears the session store
    /// and yields [`ClientError::SessionExpired`]; other failures yield
    /// [`ClientError::Http`] or [`ClientError::Network`]. Nothing is retried.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let url = Url::parse(&format!("{}{}", self.config.api_base_url, path))?;
        let headers = self.build_headers(&url, &options)?;
        let method = options.method;

        let mut request = self.client.request(method.clone(), url).headers(headers);
        if let Some(body) = options.body {
            let payload = match body {
                RequestBody::Raw(raw) => raw,
                RequestBody::Json(value) => serde_json::to_string(&value)?,
            };
            request = request.body(payload);
        }

        debug!("{method} {path}");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("API Error: {method} {path}: {e}");
                return Err(ClientError::Network(e));
            }
        };

        let status = response.status();
        debug!("Response: {status} for {method} {path}");

        if status == StatusCode::UNAUTHORIZED {
            warn!("Session expired on {method} {path}, clearing session");
            self.session.clear();
            return Err(ClientError::SessionExpired {
                redirect_to: SESSION_EXPIRED_REDIRECT.to_string(),
            });
        }

        if !status.is_success() {
            let body: Value = response
                .bytes()
                .await
                .ok()
                .and_then(|bytes| serde_json::from_slice(&bytes).ok())
                .unwrap_or_else(|| Value::Object(Default::default()));
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            error!("API Error: {method} {path}: {message}");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("API Error: {method} {path}: failed to read response body: {e}");
                return Err(ClientError::Network(e));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn build_headers(&self, url: &Url, options: &RequestOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = self.session.credential(None) {
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
        }

        if xsrf::is_mutating(&options.method) {
            let token = xsrf::token_for(self.jar.as_ref(), url).or_else(|| self.xsrf_token());
            if let Some(token) = token {
                headers.insert(HeaderName::from_static("x-xsrf-token"), header_value(&token)?);
            }
        }

        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, header_value(value)?);
        }

        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader(format!("{value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{keys, MemorySessionStore};

    fn client_with(store: Arc<MemorySessionStore>) -> ApiClient {
        let config = ClientConfig::new("http://localhost:8000/api", "http://localhost:8000")
            .expect("valid config");
        ApiClient::new(config, store).expect("client")
    }

    #[test]
    fn test_parse_method_case_insensitive() {
        assert_eq!(parse_method("post").expect("post"), Method::POST);
        assert_eq!(parse_method(" Patch ").expect("patch"), Method::PATCH);
        assert!(parse_method("BAD METHOD").is_err());
    }

    #[test]
    fn test_default_headers_present() {
        let client = client_with(Arc::new(MemorySessionStore::new()));
        let url = Url::parse("http://localhost:8000/api/kandidat").expect("url");
        let headers = client
            .build_headers(&url, &RequestOptions::get())
            .expect("headers");

        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[ACCEPT], "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());
        assert!(headers.get(xsrf::XSRF_HEADER).is_none());
    }

    #[test]
    fn test_caller_headers_override_defaults() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(keys::AUTH_TOKEN, "abc");
        let client = client_with(store);
        let url = Url::parse("http://localhost:8000/api/vote").expect("url");
        let options = RequestOptions::post()
            .header("content-type", "text/plain")
            .header("Authorization", "Basic xyz");

        let headers = client.build_headers(&url, &options).expect("headers");
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
        assert_eq!(headers[AUTHORIZATION], "Basic xyz");
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[test]
    fn test_xsrf_only_on_mutating_requests() {
        let client = client_with(Arc::new(MemorySessionStore::new()));
        let url = Url::parse("http://localhost:8000/api/vote").expect("url");
        client
            .cookie_jar()
            .add_cookie_str("XSRF-TOKEN=abc%3D; Path=/", &url);

        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            let headers = client
                .build_headers(&url, &RequestOptions::default().method(method))
                .expect("headers");
            assert_eq!(headers[xsrf::XSRF_HEADER], "abc=");
        }

        for method in [Method::GET, Method::HEAD] {
            let headers = client
                .build_headers(&url, &RequestOptions::default().method(method))
                .expect("headers");
            assert!(headers.get(xsrf::XSRF_HEADER).is_none());
        }
    }

    #[test]
    fn test_xsrf_sent_for_lowercase_verb() {
        let client = client_with(Arc::new(MemorySessionStore::new()));
        let url = Url::parse("http://localhost:8000/api/vote").expect("url");
        client
            .cookie_jar()
            .add_cookie_str("XSRF-TOKEN=tok; Path=/", &url);

        let method = Method::from_bytes(b"delete").expect("method");
        let headers = client
            .build_headers(&url, &RequestOptions::default().method(method))
            .expect("headers");
        assert_eq!(headers[xsrf::XSRF_HEADER], "tok");
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let client = client_with(Arc::new(MemorySessionStore::new()));
        let url = Url::parse("http://localhost:8000/api/vote").expect("url");
        let err = client
            .build_headers(&url, &RequestOptions::get().header("bad header", "x"))
            .expect_err("invalid name");
        assert!(matches!(err, ClientError::InvalidHeader(_)));
    }
}
