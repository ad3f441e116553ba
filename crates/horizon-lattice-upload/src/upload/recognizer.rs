//! Predicates deciding which variable values are uploads.

use super::value::VariableValue;

const DESCRIPTOR_FIELDS: [&str; 3] = ["uri", "type", "name"];

/// Decides whether a value of the variables tree is a file to upload.
///
/// Implemented for any `Fn(&VariableValue) -> bool`, so plain functions and
/// closures can be handed to a transport directly. Implementations must be
/// total and side-effect free; a panic here aborts the request.
///
/// `FileList` values are always uploads, whatever the recognizer says.
///
/// # Example
///
/// ```ignore
/// // Accept only objects shaped like `{uri, type, name}`.
/// let transport = UploadTransport::builder("https://api.example.com/graphql")
///     .is_upload_file(|value: &VariableValue| {
///         ["uri", "type", "name"]
///             .iter()
///             .all(|key| value.get(key).and_then(VariableValue::as_str).is_some())
///     })
///     .build()?;
/// ```
pub trait UploadRecognizer: Send + Sync {
    /// Returns true if `value` should be sent as a file.
    fn is_upload_file(&self, value: &VariableValue) -> bool;
}

impl<F> UploadRecognizer for F
where
    F: Fn(&VariableValue) -> bool + Send + Sync,
{
    fn is_upload_file(&self, value: &VariableValue) -> bool {
        self(value)
    }
}

/// Matches native files only.
pub fn is_native_upload_file(value: &VariableValue) -> bool {
    matches!(value, VariableValue::File(_))
}

/// The default recognizer: native files, plus file descriptor objects.
///
/// Ordinary input objects that merely have a `uri` field are not uploads.
pub fn is_upload_file(value: &VariableValue) -> bool {
    is_native_upload_file(value) || is_file_descriptor(value)
}

/// Matches the `{uri, type, name}` object a
/// [`FileDescriptor`](super::FileDescriptor) converts into, all three strings.
pub fn is_file_descriptor(value: &VariableValue) -> bool {
    DESCRIPTOR_FIELDS
        .iter()
        .all(|key| value.get(key).and_then(VariableValue::as_str).is_some())
}
