//! Parsed GraphQL response bodies.

use std::fmt;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{NetworkError, Result};

/// One entry of a response's `errors` list.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphQLError {
    /// Human-readable description.
    pub message: String,
    /// Where in the document the error applies.
    #[serde(default)]
    pub locations: Vec<GraphQLLocation>,
    /// Response path of the failing field; empty for request-level errors.
    #[serde(default)]
    pub path: Vec<PathSegment>,
    /// Server-specific details.
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        let Some((first, rest)) = self.path.split_first() else {
            return Ok(());
        };
        write!(f, " (at {first}")?;
        for segment in rest {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        f.write_str(")")
    }
}

impl std::error::Error for GraphQLError {}

/// Line and column in the request document, both 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct GraphQLLocation {
    /// Line.
    pub line: usize,
    /// Column.
    pub column: usize,
}

/// A step in an error path.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object field.
    Key(String),
    /// List position.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// The body of a GraphQL response.
///
/// A response can carry partial `data` and `errors` together; the typed
/// accessors refuse both when any error is present.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphQLResponse {
    /// Result of the operation.
    #[serde(default)]
    pub data: Option<Value>,
    /// Execution errors.
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
    /// Server-specific metadata.
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GraphQLResponse {
    /// Returns true if the server reported errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if there is data and no errors.
    pub fn is_success(&self) -> bool {
        self.data.is_some() && !self.has_errors()
    }

    /// Every error message, joined with `; `.
    pub fn error_message(&self) -> Option<String> {
        if !self.has_errors() {
            return None;
        }
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        Some(messages.join("; "))
    }

    /// Deserialize the whole `data` object.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T> {
        decode(self.checked_data()?, "data")
    }

    /// Deserialize one top-level field of `data`.
    ///
    /// ```ignore
    /// // {"data": {"singleUpload": {"id": "1", "filename": "a.txt"}}}
    /// let file: UploadedFile = response.field("singleUpload")?;
    /// ```
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .checked_data()?
            .as_object()
            .ok_or_else(|| NetworkError::InvalidBody("data is not an object".into()))?
            .get(name)
            .ok_or_else(|| NetworkError::InvalidBody(format!("no field '{name}' in data")))?;
        decode(value, name)
    }

    /// `Ok(self)` if there are no errors.
    pub fn into_result(self) -> Result<Self> {
        match self.error_message() {
            Some(message) => Err(NetworkError::Request(format!("GraphQL error: {message}"))),
            None => Ok(self),
        }
    }

    fn checked_data(&self) -> Result<&Value> {
        if let Some(message) = self.error_message() {
            return Err(NetworkError::Request(format!("GraphQL error: {message}")));
        }
        self.data
            .as_ref()
            .ok_or_else(|| NetworkError::InvalidBody("response has no data".into()))
    }
}

fn decode<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T> {
    T::deserialize(value).map_err(|e| NetworkError::Json(format!("cannot decode {what}: {e}")))
}
