//! The upload-aware transport.

use std::sync::Arc;
use std::time::Duration;

use http::header::{ACCEPT, AUTHORIZATION};

use super::extract::{extract_files, ExtractedFiles};
use super::form::UploadForm;
use super::recognizer::{is_upload_file, UploadRecognizer};
use super::value::VariableValue;
use crate::error::Result;
use crate::graphql::{
    GraphQLRequest, GraphQLTransport, HttpFetchTransport, RequestAndOptions, RequestOptions,
};
use crate::http::{HttpClient, HttpClientBuilder, HttpMethod, HttpResponse};

/// Plain-struct configuration consumed by [`create_transport`].
#[derive(Clone, Default)]
pub struct TransportOptions {
    /// The GraphQL endpoint.
    pub uri: String,
    /// Default options for every request.
    pub opts: RequestOptions,
    /// Upload recognizer; [`is_upload_file`] when unset.
    pub is_upload_file: Option<Arc<dyn UploadRecognizer>>,
}

impl TransportOptions {
    /// Options for `uri` with everything else defaulted.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for TransportOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportOptions")
            .field("uri", &self.uri)
            .field("opts", &self.opts)
            .field("custom_recognizer", &self.is_upload_file.is_some())
            .finish()
    }
}

/// Create an upload transport over the standard JSON transport.
pub fn create_transport(options: TransportOptions) -> Result<UploadTransport> {
    let TransportOptions {
        uri,
        opts,
        is_upload_file,
    } = options;

    let mut builder = UploadTransport::builder(uri).opts(opts);
    if let Some(recognizer) = is_upload_file {
        builder = builder.recognizer(recognizer);
    }
    builder.build()
}

/// Builder for [`UploadTransport`].
pub struct UploadTransportBuilder {
    uri: String,
    opts: RequestOptions,
    recognizer: Arc<dyn UploadRecognizer>,
    supports_multipart: bool,
    http_client: Option<HttpClient>,
    http_client_builder: Option<HttpClientBuilder>,
    request_timeout: Option<Duration>,
}

impl UploadTransportBuilder {
    /// Create a new builder for the given endpoint.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            opts: RequestOptions::default(),
            recognizer: Arc::new(is_upload_file),
            supports_multipart: true,
            http_client: None,
            http_client_builder: None,
            request_timeout: None,
        }
    }

    /// Set the default options for every request.
    pub fn opts(mut self, opts: RequestOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Add a default header to all requests.
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        self.opts = self.opts.header(name, value);
        self
    }

    /// Set bearer token authentication.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header(AUTHORIZATION, value)
    }

    /// Set the predicate deciding which values are uploads.
    pub fn is_upload_file(self, recognizer: impl UploadRecognizer + 'static) -> Self {
        self.recognizer(Arc::new(recognizer))
    }

    /// Set a shared upload recognizer.
    pub fn recognizer(mut self, recognizer: Arc<dyn UploadRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Declare whether multipart bodies can be sent at all.
    ///
    /// With `false`, every request goes through the base transport.
    pub fn supports_multipart(mut self, supported: bool) -> Self {
        self.supports_multipart = supported;
        self
    }

    /// Use an existing HTTP client.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Use a custom HTTP client builder.
    pub fn http_client_builder(mut self, builder: HttpClientBuilder) -> Self {
        self.http_client_builder = Some(builder);
        self
    }

    /// Set the request timeout of the HTTP client built by default.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the transport over an [`HttpFetchTransport`] sharing its
    /// endpoint, options and HTTP client.
    pub fn build(mut self) -> Result<UploadTransport> {
        let http_client = self.resolve_http_client()?;
        let base = HttpFetchTransport::new(http_client.clone(), self.uri.clone(), self.opts.clone());
        Ok(self.finish(base, http_client))
    }

    /// Build the transport over a custom base transport.
    pub fn build_with_base<T: GraphQLTransport>(mut self, base: T) -> Result<UploadTransport<T>> {
        let http_client = self.resolve_http_client()?;
        Ok(self.finish(base, http_client))
    }

    fn resolve_http_client(&mut self) -> Result<HttpClient> {
        if let Some(client) = self.http_client.take() {
            return Ok(client);
        }
        if let Some(builder) = self.http_client_builder.take() {
            return builder.build();
        }
        let mut builder = HttpClient::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    fn finish<T>(self, base: T, http_client: HttpClient) -> UploadTransport<T> {
        UploadTransport {
            base,
            http_client,
            uri: self.uri,
            opts: self.opts,
            recognizer: self.recognizer,
            supports_multipart: self.supports_multipart,
        }
    }
}

/// A transport that sends file uploads as multipart requests.
///
/// For each request it extracts files from the variables. If there are any,
/// it POSTs a `multipart/form-data` body itself; otherwise the request goes
/// to the base transport untouched, so requests without files behave exactly
/// as they would on the base transport.
///
/// # Example
///
/// ```ignore
/// use horizon_lattice_upload::graphql::{GraphQLRequest, GraphQLTransport};
/// use horizon_lattice_upload::upload::{FileList, UploadFile, UploadTransport};
///
/// let transport = UploadTransport::builder("https://api.example.com/graphql").build()?;
///
/// let photos: FileList = vec![
///     UploadFile::new("a.jpg", a_bytes).with_mime_type("image/jpeg"),
///     UploadFile::new("b.jpg", b_bytes).with_mime_type("image/jpeg"),
/// ].into();
///
/// // variables: {"album": {"photos": "album.photos"}}
/// // fields:    query, variables, album.photos, album.photos
/// let request = GraphQLRequest::mutation("mutation($album: AlbumInput!) { addAlbum(album: $album) { id } }")
///     .variable("album", [("photos", photos)].into_iter().collect::<VariableValue>());
/// let response = transport.execute(request).await?;
/// ```
pub struct UploadTransport<T = HttpFetchTransport> {
    base: T,
    http_client: HttpClient,
    uri: String,
    opts: RequestOptions,
    recognizer: Arc<dyn UploadRecognizer>,
    supports_multipart: bool,
}

impl UploadTransport {
    /// Create a builder for the given endpoint.
    pub fn builder(uri: impl Into<String>) -> UploadTransportBuilder {
        UploadTransportBuilder::new(uri)
    }
}

impl<T: GraphQLTransport> UploadTransport<T> {
    /// The wrapped base transport.
    pub fn base(&self) -> &T {
        &self.base
    }

    /// Default options applied to upload requests.
    pub fn opts(&self) -> &RequestOptions {
        &self.opts
    }

    /// Whether multipart bodies are sent at all.
    pub fn supports_multipart(&self) -> bool {
        self.supports_multipart
    }

    /// Run file extraction with this transport's recognizer.
    pub fn extract_files(&self, variables: &VariableValue) -> ExtractedFiles {
        extract_files(variables, self.recognizer.as_ref())
    }

    /// Lay out the multipart form for `request`, or `None` if the request
    /// should go through the base transport.
    pub fn upload_form(&self, request: &GraphQLRequest) -> Result<Option<UploadForm>> {
        if !self.supports_multipart {
            tracing::trace!(target: "horizon_lattice_upload::transport", "multipart unsupported, using base transport");
            return Ok(None);
        }

        let Some(variables) = request.variables.as_ref().filter(|v| v.is_container()) else {
            tracing::trace!(target: "horizon_lattice_upload::transport", "no variables to scan, using base transport");
            return Ok(None);
        };

        let extracted = self.extract_files(variables);
        if extracted.is_empty() {
            tracing::trace!(target: "horizon_lattice_upload::transport", "no files found, using base transport");
            return Ok(None);
        }

        tracing::debug!(
            target: "horizon_lattice_upload::transport",
            file_count = extracted.files.len(),
            tokens = ?extracted.tokens().collect::<Vec<_>>(),
            "sending multipart upload"
        );
        UploadForm::build(&request.query, &extracted).map(Some)
    }

    async fn send_form(&self, form: UploadForm, options: &RequestOptions) -> Result<HttpResponse> {
        let options = self.opts.merged_with(options);
        let form = form.into_multipart().await?;

        self.http_client
            .post(&self.uri)
            .method(options.method.unwrap_or(HttpMethod::Post))
            .header(ACCEPT, "application/json")
            .headers(options.headers)
            .timeout_opt(options.timeout)
            .multipart(form)
            .await
    }
}

impl<T: GraphQLTransport> GraphQLTransport for UploadTransport<T> {
    fn uri(&self) -> &str {
        &self.uri
    }

    async fn fetch_from_remote_endpoint(
        &self,
        request_and_options: RequestAndOptions,
    ) -> Result<HttpResponse> {
        match self.upload_form(&request_and_options.request)? {
            Some(form) => self.send_form(form, &request_and_options.options).await,
            None => self.base.fetch_from_remote_endpoint(request_and_options).await,
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for UploadTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadTransport")
            .field("uri", &self.uri)
            .field("supports_multipart", &self.supports_multipart)
            .field("base", &self.base)
            .finish()
    }
}
