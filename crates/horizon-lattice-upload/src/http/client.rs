//! The shared HTTP client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::redirect::Policy;

use super::request::{HttpMethod, HttpRequestBuilder};
use crate::error::{NetworkError, Result};

/// Settings a [`HttpClient`] is built from.
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Whole-request timeout. Uploads of large files may need more than the default.
    pub timeout: Option<Duration>,
    /// Timeout for establishing the connection.
    pub connect_timeout: Option<Duration>,
    /// Redirects to follow before failing; `None` disables following.
    pub redirect_limit: Option<usize>,
    /// Keep cookies between requests.
    pub cookie_store: bool,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Proxy for all schemes.
    pub proxy: Option<String>,
    /// Headers sent with every request.
    pub default_headers: http::HeaderMap,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            redirect_limit: Some(10),
            cookie_store: true,
            user_agent: concat!("HorizonLatticeUpload/", env!("CARGO_PKG_VERSION"), " (Rust)").to_string(),
            proxy: None,
            default_headers: http::HeaderMap::new(),
        }
    }
}

impl HttpClientConfig {
    fn to_reqwest(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .cookie_store(self.cookie_store)
            .default_headers(self.default_headers.clone())
            .redirect(self.redirect_limit.map_or_else(Policy::none, Policy::limited));

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(proxy) = &self.proxy {
            builder = builder
                .proxy(reqwest::Proxy::all(proxy).map_err(|e| NetworkError::Proxy(e.to_string()))?);
        }

        Ok(builder.build()?)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Let requests run as long as they take.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Follow at most `max` redirects.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.redirect_limit = Some(max);
        self
    }

    /// Return redirect responses instead of following them.
    pub fn no_redirects(mut self) -> Self {
        self.config.redirect_limit = None;
        self
    }

    /// Do not keep cookies.
    pub fn no_cookies(mut self) -> Self {
        self.config.cookie_store = false;
        self
    }

    /// Replace the `User-Agent`.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Route all requests through a proxy.
    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy_url.into());
        self
    }

    /// Send a header with every request.
    pub fn default_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Result<Self> {
        let name = name
            .try_into()
            .map_err(|_| NetworkError::InvalidHeader("invalid header name".into()))?;
        let value = value
            .try_into()
            .map_err(|_| NetworkError::InvalidHeader(format!("invalid value for {name}")))?;
        self.config.default_headers.insert(name, value);
        Ok(self)
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpClient> {
        HttpClient::with_config(self.config)
    }
}

/// A cloneable handle to a connection pool.
///
/// Clones share connections, cookies and configuration, so the JSON
/// transport and the upload transport built together talk to the server
/// over the same pool.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Start building a client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Build a client from a finished configuration.
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = config.to_reqwest()?;
        Ok(Self {
            inner: Arc::new(Inner { client, config }),
        })
    }

    /// The configuration the client was built with.
    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    /// Start a GET request.
    pub fn get(&self, url: impl AsRef<str>) -> HttpRequestBuilder {
        self.request(HttpMethod::Get, url)
    }

    /// Start a POST request.
    pub fn post(&self, url: impl AsRef<str>) -> HttpRequestBuilder {
        self.request(HttpMethod::Post, url)
    }

    /// Start a request with any method.
    pub fn request(&self, method: HttpMethod, url: impl AsRef<str>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(self.clone(), method, url.as_ref())
    }

    pub(crate) fn reqwest_client(&self) -> &reqwest::Client {
        &self.inner.client
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HttpClient").field(&self.inner.config).finish()
    }
}
