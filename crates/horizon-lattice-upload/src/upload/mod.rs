//! File uploads over GraphQL multipart requests.
//!
//! Files can sit anywhere in a request's variables. Before sending,
//! [`UploadTransport`] walks the variables, swaps every file for a token
//! naming its path, and posts a `multipart/form-data` body:
//!
//! | field       | value                                   |
//! |-------------|-----------------------------------------|
//! | `query`     | the GraphQL document                    |
//! | `variables` | JSON of the variables with tokens       |
//! | *token*     | file contents, repeated for file lists  |
//!
//! Requests without files go through the base transport as plain JSON.
//!
//! # Example
//!
//! ```ignore
//! use horizon_lattice_upload::graphql::{GraphQLRequest, GraphQLTransport};
//! use horizon_lattice_upload::upload::{UploadFile, UploadTransport};
//!
//! let transport = UploadTransport::builder("https://api.example.com/graphql")
//!     .bearer_auth("my-token")
//!     .build()?;
//!
//! let request = GraphQLRequest::mutation(r#"
//!     mutation Upload($file: Upload!) {
//!         upload(file: $file) { id }
//!     }
//! "#)
//! .variable("file", UploadFile::open("report.pdf").await?.with_mime_type("application/pdf"));
//!
//! let response = transport.execute(request).await?;
//! ```

mod extract;
mod form;
mod recognizer;
mod transport;
mod value;

pub use extract::{extract_files, ExtractedFile, ExtractedFiles, UploadPayload, TOKEN_DELIMITER};
pub use form::{FormField, UploadForm, QUERY_FIELD, VARIABLES_FIELD};
pub use recognizer::{is_file_descriptor, is_native_upload_file, is_upload_file, UploadRecognizer};
pub use transport::{create_transport, TransportOptions, UploadTransport, UploadTransportBuilder};
pub use value::{FileDescriptor, FileList, UploadFile, VariableValue, DEFAULT_MIME_TYPE};
