//! HTTP plumbing for the GraphQL transports.
//!
//! A thin layer over `reqwest` that the JSON transport and the multipart
//! upload transport share.
//!
//! # Example
//!
//! ```ignore
//! use horizon_lattice_upload::http::{HttpClient, MultipartForm};
//!
//! let client = HttpClient::builder().build()?;
//!
//! let form = MultipartForm::new()
//!     .text("query", "mutation($file: Upload!) { upload(file: $file) }")
//!     .text("variables", r#"{"file":"file"}"#)
//!     .file_bytes("file", file_bytes, "avatar.png", Some("image/png"));
//! let response = client.post("https://api.example.com/graphql").multipart(form).await?;
//! ```

mod client;
mod multipart;
mod request;
mod response;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use multipart::MultipartForm;
pub use request::{HttpMethod, HttpRequest, HttpRequestBuilder, RequestBody};
pub use response::HttpResponse;
