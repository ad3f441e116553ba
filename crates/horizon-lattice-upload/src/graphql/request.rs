//! GraphQL request types.

use serde::Serialize;
use serde_json::Value;

use crate::upload::VariableValue;

/// Kind of operation a document performs. Uploads are normally mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationType {
    /// `query`, also the shorthand `{ ... }` form.
    #[default]
    Query,
    /// `mutation`
    Mutation,
    /// `subscription`
    Subscription,
}

impl OperationType {
    fn from_document(document: &str) -> Self {
        match document.trim_start().split(|c: char| !c.is_alphanumeric()).next() {
            Some("mutation") => Self::Mutation,
            Some("subscription") => Self::Subscription,
            _ => Self::Query,
        }
    }
}

/// A GraphQL request.
///
/// Serializes to the standard JSON body. Upload files in `variables`
/// serialize as `null`; [`UploadTransport`](crate::upload::UploadTransport)
/// sends them as multipart parts instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLRequest {
    /// The GraphQL query string, sent as-is.
    pub query: String,

    /// Optional variables for the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<VariableValue>,

    /// Optional operation name (for documents with multiple operations).
    #[serde(skip_serializing_if = "Option::is_none", rename = "operationName")]
    pub operation_name: Option<String>,

    /// Extensions (implementation-specific metadata).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,

    #[serde(skip)]
    pub(crate) operation_type: OperationType,
}

impl GraphQLRequest {
    fn with_type(query: String, operation_type: OperationType) -> Self {
        Self {
            query,
            variables: None,
            operation_name: None,
            extensions: None,
            operation_type,
        }
    }

    /// Create a new query request.
    pub fn query(query: impl Into<String>) -> Self {
        Self::with_type(query.into(), OperationType::Query)
    }

    /// Create a new mutation request.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let request = GraphQLRequest::mutation(r#"
    ///     mutation Test($file: Upload!) {
    ///         test(file: $file) { id }
    ///     }
    /// "#)
    /// .variable("file", UploadFile::new("test.txt", "hello"));
    /// ```
    pub fn mutation(query: impl Into<String>) -> Self {
        Self::with_type(query.into(), OperationType::Mutation)
    }

    /// Create a request, reading the operation type from the document's
    /// leading keyword.
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let operation_type = OperationType::from_document(&query);
        Self::with_type(query, operation_type)
    }

    /// Set a variable value.
    ///
    /// Turns `variables` into an object if it is unset or not one.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<VariableValue>) -> Self {
        let variables = self.variables.get_or_insert_with(VariableValue::object);
        if !matches!(variables, VariableValue::Object(_)) {
            *variables = VariableValue::object();
        }
        variables.insert(name, value);
        self
    }

    /// Set the whole variables tree.
    pub fn variables(mut self, variables: impl Into<VariableValue>) -> Self {
        self.variables = Some(variables.into());
        self
    }

    /// Set variables from any serializable value.
    ///
    /// Values that fail to serialize leave the variables unset.
    pub fn json_variables(mut self, variables: impl Serialize) -> Self {
        self.variables = serde_json::to_value(variables).ok().map(VariableValue::from);
        self
    }

    /// Set the operation name.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Set extensions (implementation-specific metadata).
    pub fn extensions(mut self, extensions: impl Serialize) -> Self {
        self.extensions = serde_json::to_value(extensions).ok();
        self
    }

    /// Get the operation type.
    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }
}
