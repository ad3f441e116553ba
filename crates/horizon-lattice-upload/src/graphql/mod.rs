//! GraphQL requests, responses and transports.
//!
//! A [`GraphQLTransport`] sends a [`GraphQLRequest`] to an endpoint.
//! [`HttpFetchTransport`] is the plain JSON transport; the upload transport in
//! [`crate::upload`] wraps it.
//!
//! # Example
//!
//! ```ignore
//! use horizon_lattice_upload::graphql::{GraphQLRequest, GraphQLTransport, HttpFetchTransport};
//!
//! let transport = HttpFetchTransport::with_uri("https://api.example.com/graphql")?;
//!
//! let request = GraphQLRequest::query(r#"
//!     query GetUser($id: ID!) {
//!         user(id: $id) { id name }
//!     }
//! "#)
//! .variable("id", "123");
//!
//! let response = transport.execute(request).await?;
//! let user: User = response.field("user")?;
//! ```

mod request;
mod response;
mod transport;

pub use request::{GraphQLRequest, OperationType};
pub use response::{GraphQLError, GraphQLLocation, GraphQLResponse, PathSegment};
pub use transport::{GraphQLTransport, HttpFetchTransport, RequestAndOptions, RequestOptions};
