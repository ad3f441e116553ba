//! GraphQL file uploads for Horizon Lattice.
//!
//! This crate sends GraphQL requests whose variables contain files, using
//! the GraphQL multipart request convention:
//!
//! - **Variables tree**: [`VariableValue`] holds JSON-like data plus
//!   [`UploadFile`] and [`FileList`] leaves anywhere in the tree
//! - **Extraction**: [`extract_files`] swaps each file for a dot-path token
//!   and lists the files under their tokens
//! - **Transport**: [`UploadTransport`] posts `multipart/form-data` when files
//!   are present and otherwise delegates to a plain JSON transport
//!
//! # Example
//!
//! ```ignore
//! use horizon_lattice_upload::{GraphQLRequest, GraphQLTransport, UploadFile, UploadTransport};
//!
//! let transport = UploadTransport::builder("https://api.example.com/graphql").build()?;
//!
//! let request = GraphQLRequest::mutation(r#"
//!     mutation Test($file: Upload!) {
//!         test(file: $file) { id }
//!     }
//! "#)
//! .variable("file", UploadFile::new("test.txt", "hello"));
//!
//! // multipart fields: query, variables = {"file":"file"}, file = <bytes>
//! let response = transport.execute(request).await?;
//! ```
//!
//! # Recognizing files
//!
//! Which values count as files is decided by an [`UploadRecognizer`]. The
//! default, [`is_upload_file`], accepts native files and `{uri, type, name}`
//! objects such as a converted [`FileDescriptor`]; pass any closure to
//! [`UploadTransportBuilder::is_upload_file`] to change it. File lists are
//! always uploads.

mod error;
pub mod graphql;
pub mod http;
pub mod upload;

pub use error::{NetworkError, Result};

pub use graphql::{
    GraphQLRequest, GraphQLResponse, GraphQLTransport, HttpFetchTransport, RequestAndOptions,
    RequestOptions,
};
pub use self::http::{HttpClient, HttpClientBuilder, HttpMethod, HttpResponse, MultipartForm};
pub use upload::{
    create_transport, extract_files, is_upload_file, ExtractedFile, ExtractedFiles, FileDescriptor,
    FileList, TransportOptions, UploadFile, UploadPayload, UploadRecognizer, UploadTransport,
    UploadTransportBuilder, VariableValue,
};
