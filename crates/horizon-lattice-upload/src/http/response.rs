//! Responses.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{NetworkError, Result};

/// A response whose headers have arrived; the body is read on demand.
pub struct HttpResponse {
    inner: reqwest::Response,
}

impl HttpResponse {
    pub(crate) fn from_reqwest(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// All headers.
    pub fn headers(&self) -> &http::HeaderMap {
        self.inner.headers()
    }

    /// One header as text, if present and printable.
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// The `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE)
    }

    /// URL of the final response, after redirects.
    pub fn url(&self) -> &str {
        self.inner.url().as_str()
    }

    /// Read the body as text.
    pub async fn text(self) -> Result<String> {
        Ok(self.inner.text().await?)
    }

    /// Read the body as bytes.
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.inner.bytes().await?)
    }

    /// Read the body and parse it as JSON.
    ///
    /// A body that does not parse is a [`NetworkError::Json`] error.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Turn a non-2xx status into [`NetworkError::HttpStatus`], carrying the
    /// body text as the message.
    pub async fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = self.text().await.ok().filter(|body| !body.is_empty());
        Err(NetworkError::HttpStatus { status, message })
    }
}

impl<T: Into<reqwest::Body>> From<http::Response<T>> for HttpResponse {
    fn from(response: http::Response<T>) -> Self {
        Self::from_reqwest(response.into())
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status())
            .field("url", &self.url())
            .finish_non_exhaustive()
    }
}
