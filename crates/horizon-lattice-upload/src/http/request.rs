//! Request building.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

use super::client::HttpClient;
use super::multipart::MultipartForm;
use super::response::HttpResponse;
use crate::error::{NetworkError, Result};

/// Methods a GraphQL endpoint may be called with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
}

impl HttpMethod {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Patch => Self::PATCH,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-multipart request body.
#[derive(Clone, Debug, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// UTF-8 text, including serialized JSON.
    Text(String),
    /// Raw bytes.
    Bytes(Bytes),
}

/// A request as it will be sent, minus the client.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// Method.
    pub method: HttpMethod,
    /// Target URL, before query parameters are appended.
    pub url: String,
    /// Headers, on top of the client's defaults.
    pub headers: http::HeaderMap,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Body.
    pub body: RequestBody,
    /// Per-request timeout, overriding the client's.
    pub timeout: Option<Duration>,
}

/// Builder returned by [`HttpClient::post`] and friends.
///
/// Mistakes made while building (an unparsable header, a value that does not
/// serialize) are kept and reported when the request is sent.
pub struct HttpRequestBuilder {
    client: HttpClient,
    request: HttpRequest,
    error: Option<NetworkError>,
}

impl HttpRequestBuilder {
    pub(crate) fn new(client: HttpClient, method: HttpMethod, url: &str) -> Self {
        Self {
            client,
            request: HttpRequest {
                method,
                url: url.to_string(),
                headers: http::HeaderMap::new(),
                query: Vec::new(),
                body: RequestBody::Empty,
                timeout: None,
            },
            error: None,
        }
    }

    fn fail(mut self, error: NetworkError) -> Self {
        self.error.get_or_insert(error);
        self
    }

    /// Change the method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.request.method = method;
        self
    }

    /// Set a header, replacing any earlier value.
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        let Ok(name) = name.try_into() else {
            return self.fail(NetworkError::InvalidHeader("invalid header name".into()));
        };
        let Ok(value) = value.try_into() else {
            return self.fail(NetworkError::InvalidHeader(format!("invalid value for {name}")));
        };
        self.request.headers.insert(name, value);
        self
    }

    /// Set several headers, replacing earlier values of the same names.
    pub fn headers(mut self, headers: http::HeaderMap) -> Self {
        self.request.headers.extend(headers);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.query.push((key.into(), value.into()));
        self
    }

    /// Send `body` as is.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.request.body = RequestBody::Text(body.into());
        self
    }

    /// Serialize `body` as JSON and mark the request `application/json`.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(text) => self.header(CONTENT_TYPE, "application/json").text(text),
            Err(e) => self.fail(e.into()),
        }
    }

    /// Send raw bytes.
    pub fn bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.request.body = RequestBody::Bytes(body.into());
        self
    }

    /// Authenticate with a bearer token.
    pub fn bearer_auth(self, token: impl fmt::Display) -> Self {
        match http::HeaderValue::try_from(format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.header(AUTHORIZATION, value)
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Override the client's timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = Some(timeout);
        self
    }

    /// Override the client's timeout if `timeout` is set.
    pub fn timeout_opt(self, timeout: Option<Duration>) -> Self {
        match timeout {
            Some(timeout) => self.timeout(timeout),
            None => self,
        }
    }

    /// The request as built so far.
    pub fn build(self) -> HttpRequest {
        self.request
    }

    /// Send the request.
    pub async fn send(self) -> Result<HttpResponse> {
        let (builder, body) = self.into_reqwest()?;
        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Text(text) => builder.body(text),
            RequestBody::Bytes(bytes) => builder.body(bytes),
        };
        Ok(HttpResponse::from_reqwest(builder.send().await?))
    }

    /// Send the request with `form` as a `multipart/form-data` body.
    ///
    /// Any other body is discarded, and so is a `Content-Type` header; the
    /// form sets its own with the boundary.
    pub async fn multipart(mut self, form: MultipartForm) -> Result<HttpResponse> {
        self.request.headers.remove(CONTENT_TYPE);
        let (builder, _) = self.into_reqwest()?;
        let response = builder.multipart(form.into_reqwest()).send().await?;
        Ok(HttpResponse::from_reqwest(response))
    }

    fn into_reqwest(self) -> Result<(reqwest::RequestBuilder, RequestBody)> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let HttpRequest {
            method,
            url,
            headers,
            query,
            body,
            timeout,
        } = self.request;

        let mut url = url::Url::parse(&url)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query);
        }

        let mut builder = self
            .client
            .reqwest_client()
            .request(method.into(), url)
            .headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok((builder, body))
    }
}
