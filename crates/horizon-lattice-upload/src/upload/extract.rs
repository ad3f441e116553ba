//! Extraction of upload files from a variables tree.
//!
//! The walk is depth-first and pre-order. Every value accepted as an upload
//! is replaced, in a copy of the tree, by its path joined with
//! [`TOKEN_DELIMITER`], and the original value is recorded under that token.
//! Tokens are unique because paths in a tree are, except when an object key
//! itself contains the delimiter: `{"a.b": f}` and `{"a": {"b": f}}` both
//! produce `a.b`. Such keys are not escaped.

use super::recognizer::UploadRecognizer;
use super::value::{UploadFile, VariableValue};

/// Separator between path segments in a token.
pub const TOKEN_DELIMITER: &str = ".";

/// What was found at a token's position.
#[derive(Clone, Debug, PartialEq)]
pub enum UploadPayload {
    /// A value accepted by the recognizer, kept as-is.
    Single(VariableValue),
    /// The files of a `FileList`, in order. May be empty.
    Collection(Vec<UploadFile>),
}

impl UploadPayload {
    /// Number of parts this payload turns into.
    pub fn part_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Collection(files) => files.len(),
        }
    }
}

/// One extracted upload.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedFile {
    /// The token that replaced the upload in the rewritten tree.
    pub name: String,
    /// The upload itself.
    pub file: UploadPayload,
}

/// Result of [`extract_files`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedFiles {
    /// The rewritten tree, with every upload replaced by its token.
    pub variables: VariableValue,
    /// The uploads in traversal order.
    pub files: Vec<ExtractedFile>,
}

impl ExtractedFiles {
    /// Returns true if no uploads were found.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over the tokens in traversal order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.name.as_str())
    }
}

/// Walk `variables`, pulling out every upload.
///
/// A value is an upload if it is a `FileList` or `recognizer` accepts it;
/// uploads are not searched further. `List` and `Object` values are walked,
/// everything else is copied unchanged. The input is never modified.
///
/// The root itself is never treated as an upload: a scalar root comes back
/// unchanged with no files.
pub fn extract_files(variables: &VariableValue, recognizer: &dyn UploadRecognizer) -> ExtractedFiles {
    let mut walker = Walker {
        recognizer,
        path: Vec::new(),
        files: Vec::new(),
    };
    let variables = walker.walk_tree(variables);

    ExtractedFiles {
        variables,
        files: walker.files,
    }
}

struct Walker<'r> {
    recognizer: &'r dyn UploadRecognizer,
    path: Vec<String>,
    files: Vec<ExtractedFile>,
}

impl Walker<'_> {
    fn walk_tree(&mut self, tree: &VariableValue) -> VariableValue {
        match tree {
            VariableValue::List(items) => {
                let mut mapped = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    mapped.push(self.visit(index.to_string(), item));
                }
                VariableValue::List(mapped)
            }
            VariableValue::Object(map) => {
                let mut mapped = indexmap::IndexMap::with_capacity(map.len());
                for (key, value) in map {
                    mapped.insert(key.clone(), self.visit(key.clone(), value));
                }
                VariableValue::Object(mapped)
            }
            other => other.clone(),
        }
    }

    fn visit(&mut self, key: String, value: &VariableValue) -> VariableValue {
        self.path.push(key);
        let mapped = if let Some(file) = self.upload_payload(value) {
            let name = self.path.join(TOKEN_DELIMITER);
            self.files.push(ExtractedFile {
                name: name.clone(),
                file,
            });
            VariableValue::String(name)
        } else if value.is_container() {
            self.walk_tree(value)
        } else {
            value.clone()
        };
        self.path.pop();
        mapped
    }

    fn upload_payload(&self, value: &VariableValue) -> Option<UploadPayload> {
        match value {
            VariableValue::FileList(files) => Some(UploadPayload::Collection(files.as_slice().to_vec())),
            VariableValue::Null => None,
            _ if self.recognizer.is_upload_file(value) => Some(UploadPayload::Single(value.clone())),
            _ => None,
        }
    }
}
