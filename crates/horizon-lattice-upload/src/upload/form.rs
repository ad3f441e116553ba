//! Multipart body layout for upload requests.
//!
//! [`UploadForm`] is the field plan: `query`, then `variables`, then one
//! field per extracted file, with collections repeating the same field
//! name once per file. Building it is synchronous and cheap; turning it into
//! a [`MultipartForm`] may read descriptor files from disk.

use std::path::PathBuf;

use super::extract::{ExtractedFiles, UploadPayload};
use super::value::{FileDescriptor, VariableValue};
use crate::error::{NetworkError, Result};
use crate::http::MultipartForm;

/// Name of the field carrying the GraphQL document.
pub const QUERY_FIELD: &str = "query";

/// Name of the field carrying the rewritten variables as JSON.
pub const VARIABLES_FIELD: &str = "variables";

/// A single field of an upload form.
#[derive(Clone, Debug, PartialEq)]
pub enum FormField {
    /// A plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// A file field; the value is the upload exactly as extracted.
    Upload {
        /// Field name (the token).
        name: String,
        /// The upload value.
        value: VariableValue,
    },
}

impl FormField {
    /// The field name.
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::Upload { name, .. } => name,
        }
    }
}

/// The ordered field plan of a multipart upload request.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadForm {
    fields: Vec<FormField>,
}

impl UploadForm {
    /// Lay out the form for `query` and the result of an extraction.
    pub fn build(query: &str, extracted: &ExtractedFiles) -> Result<Self> {
        let mut fields = Vec::with_capacity(2 + extracted.files.len());
        fields.push(FormField::Text {
            name: QUERY_FIELD.to_string(),
            value: query.to_string(),
        });
        fields.push(FormField::Text {
            name: VARIABLES_FIELD.to_string(),
            value: serde_json::to_string(&extracted.variables)?,
        });

        for file in &extracted.files {
            match &file.file {
                UploadPayload::Single(value) => fields.push(FormField::Upload {
                    name: file.name.clone(),
                    value: value.clone(),
                }),
                UploadPayload::Collection(files) => {
                    for item in files {
                        fields.push(FormField::Upload {
                            name: file.name.clone(),
                            value: VariableValue::File(item.clone()),
                        });
                    }
                }
            }
        }

        Ok(Self { fields })
    }

    /// All fields in order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Field names in order, repeated names included.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FormField::name)
    }

    /// The first field with the given name.
    pub fn get(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Every field with the given name, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormField> + 'a {
        self.fields.iter().filter(move |f| f.name() == name)
    }

    /// Value of the first text field with the given name.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            FormField::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Encode the fields into a multipart body, preserving their order.
    pub async fn into_multipart(self) -> Result<MultipartForm> {
        let mut form = MultipartForm::new();
        for field in self.fields {
            form = match field {
                FormField::Text { name, value } => form.text(name, value),
                FormField::Upload { name, value } => append_upload(form, name, value).await?,
            };
        }
        Ok(form)
    }
}

async fn append_upload(form: MultipartForm, name: String, value: VariableValue) -> Result<MultipartForm> {
    if let VariableValue::File(file) = &value {
        return Ok(form.file_bytes(
            name,
            file.contents().clone(),
            file.name(),
            Some(file.mime_type()),
        ));
    }

    if let Some(descriptor) = FileDescriptor::from_value(&value) {
        let path = local_path(&descriptor.uri)?;
        let contents = tokio::fs::read(&path)
            .await
            .map_err(|e| NetworkError::Io(format!("{}: {}", path.display(), e)))?;
        return Ok(form.file_bytes(
            name,
            contents,
            descriptor.name,
            Some(descriptor.mime_type.as_str()),
        ));
    }

    // anything else a custom recognizer accepted goes out as text
    let text = match value {
        VariableValue::String(s) => s,
        other => serde_json::to_string(&other)?,
    };
    Ok(form.text(name, text))
}

/// Resolve a descriptor location to a local path.
///
/// `file://` URLs are converted; strings that are not absolute URLs are
/// taken as paths. Other URL schemes cannot be read and are rejected.
fn local_path(uri: &str) -> Result<PathBuf> {
    match url::Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|()| NetworkError::UnsupportedUri(uri.to_string())),
        // a one-letter scheme is a Windows drive prefix such as `C:\`
        Ok(url) if url.scheme().len() > 1 => Err(NetworkError::UnsupportedUri(uri.to_string())),
        _ => Ok(PathBuf::from(uri)),
    }
}
