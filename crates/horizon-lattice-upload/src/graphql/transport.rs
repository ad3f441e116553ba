//! The transport abstraction and the plain JSON transport.

use std::future::Future;
use std::time::Duration;

use http::header::{ACCEPT, CONTENT_TYPE};

use super::request::GraphQLRequest;
use super::response::GraphQLResponse;
use crate::error::Result;
use crate::http::{HttpClient, HttpMethod, HttpResponse};

/// Per-request HTTP options.
///
/// Transports hold a default set; options passed with a request are merged
/// on top with [`RequestOptions::merged_with`].
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// HTTP method override. Transports POST when unset.
    pub method: Option<HttpMethod>,
    /// Extra headers.
    pub headers: http::HeaderMap,
    /// Timeout for this request.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the HTTP method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Add a header. Invalid names or values are logged and skipped.
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        match (name.try_into(), value.try_into()) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                tracing::warn!(target: "horizon_lattice_upload::graphql", "Skipping invalid request header");
            }
        }
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Combine with `other`, whose method, timeout and headers win.
    pub fn merged_with(&self, other: &RequestOptions) -> RequestOptions {
        let mut headers = self.headers.clone();
        headers.extend(other.headers.clone());
        RequestOptions {
            method: other.method.or(self.method),
            headers,
            timeout: other.timeout.or(self.timeout),
        }
    }
}

/// A request together with the options to send it with.
#[derive(Clone, Debug)]
pub struct RequestAndOptions {
    /// The GraphQL request.
    pub request: GraphQLRequest,
    /// HTTP options for this call.
    pub options: RequestOptions,
}

impl RequestAndOptions {
    /// Wrap a request with empty options.
    pub fn new(request: GraphQLRequest) -> Self {
        Self {
            request,
            options: RequestOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

impl From<GraphQLRequest> for RequestAndOptions {
    fn from(request: GraphQLRequest) -> Self {
        Self::new(request)
    }
}

/// Sends GraphQL requests to a remote endpoint.
///
/// Transports compose: [`UploadTransport`](crate::upload::UploadTransport)
/// wraps another transport and hands it every request it does not encode
/// itself.
pub trait GraphQLTransport: Send + Sync {
    /// The endpoint requests are sent to.
    fn uri(&self) -> &str;

    /// Send a request and return the raw HTTP response.
    fn fetch_from_remote_endpoint(
        &self,
        request_and_options: RequestAndOptions,
    ) -> impl Future<Output = Result<HttpResponse>> + Send;

    /// Send a request with default options and parse the GraphQL response.
    ///
    /// Non-2xx statuses become [`NetworkError::HttpStatus`](crate::NetworkError::HttpStatus)
    /// carrying the body.
    fn execute(
        &self,
        request: GraphQLRequest,
    ) -> impl Future<Output = Result<GraphQLResponse>> + Send {
        async move {
            self.fetch_from_remote_endpoint(RequestAndOptions::new(request))
                .await?
                .error_for_status()
                .await?
                .json()
                .await
        }
    }
}

/// The standard transport: POSTs the request as a JSON body.
#[derive(Clone, Debug)]
pub struct HttpFetchTransport {
    http_client: HttpClient,
    uri: String,
    opts: RequestOptions,
}

impl HttpFetchTransport {
    /// Create a transport for `uri` with default options `opts`.
    pub fn new(http_client: HttpClient, uri: impl Into<String>, opts: RequestOptions) -> Self {
        Self {
            http_client,
            uri: uri.into(),
            opts,
        }
    }

    /// Create a transport with its own default HTTP client.
    pub fn with_uri(uri: impl Into<String>) -> Result<Self> {
        Ok(Self::new(HttpClient::builder().build()?, uri, RequestOptions::default()))
    }

    /// Default options applied to every request.
    pub fn opts(&self) -> &RequestOptions {
        &self.opts
    }

    /// The HTTP client in use.
    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }
}

impl GraphQLTransport for HttpFetchTransport {
    fn uri(&self) -> &str {
        &self.uri
    }

    async fn fetch_from_remote_endpoint(
        &self,
        request_and_options: RequestAndOptions,
    ) -> Result<HttpResponse> {
        let RequestAndOptions { request, options } = request_and_options;
        let options = self.opts.merged_with(&options);
        let body = serde_json::to_string(&request)?;

        self.http_client
            .post(&self.uri)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .method(options.method.unwrap_or(HttpMethod::Post))
            .headers(options.headers)
            .timeout_opt(options.timeout)
            .text(body)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_merge() {
        let defaults = RequestOptions::new()
            .header("x-client", "lattice")
            .header("authorization", "Bearer a")
            .timeout(Duration::from_secs(30));
        let call = RequestOptions::new()
            .method(HttpMethod::Put)
            .header("authorization", "Bearer b");

        let merged = defaults.merged_with(&call);

        assert_eq!(merged.method, Some(HttpMethod::Put));
        assert_eq!(merged.timeout, Some(Duration::from_secs(30)));
        assert_eq!(merged.headers["x-client"], "lattice");
        assert_eq!(merged.headers["authorization"], "Bearer b");
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let options = RequestOptions::new().header("bad header", "x");
        assert!(options.headers.is_empty());
    }

    #[test]
    fn test_fetch_transport_uri() {
        let transport = HttpFetchTransport::with_uri("https://api.example.com/graphql").unwrap();
        assert_eq!(transport.uri(), "https://api.example.com/graphql");
        assert!(transport.opts().method.is_none());
    }
}
