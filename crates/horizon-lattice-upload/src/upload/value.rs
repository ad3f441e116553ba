//! The GraphQL variables tree and the file values that can live inside it.

use std::path::Path;

use bytes::Bytes;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Number;

use crate::error::{NetworkError, Result};

/// MIME type used when none is known.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A node of a GraphQL variables tree.
///
/// Besides the JSON shapes, a tree can hold native upload files. `File` and
/// `FileList` leaves serialize as `null` (and a list of `null`s), the
/// placeholder the multipart request convention uses for file positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum VariableValue {
    /// `null`.
    #[default]
    Null,
    /// A boolean.
    Boolean(bool),
    /// A number.
    Number(Number),
    /// A string.
    String(String),
    /// An ordered sequence of values.
    List(Vec<VariableValue>),
    /// A string-keyed map. Iteration follows insertion order.
    Object(IndexMap<String, VariableValue>),
    /// A single native file.
    File(UploadFile),
    /// A native collection of files.
    FileList(FileList),
}

impl VariableValue {
    /// Create an empty object.
    pub fn object() -> Self {
        Self::Object(IndexMap::new())
    }

    /// Returns true for `List` and `Object`, the shapes the extractor walks into.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::List(_) | Self::Object(_))
    }

    /// Returns true for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the string, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the map, if this is an `Object`.
    pub fn as_object(&self) -> Option<&IndexMap<String, VariableValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the items, if this is a `List`.
    pub fn as_list(&self) -> Option<&[VariableValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key of an `Object`.
    pub fn get(&self, key: &str) -> Option<&VariableValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Insert a key into an `Object`, returning the previous value.
    ///
    /// Does nothing on other shapes.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<VariableValue>) -> Option<VariableValue> {
        match self {
            Self::Object(map) => map.insert(key.into(), value.into()),
            _ => None,
        }
    }

    /// Convert to JSON, replacing file leaves with `null`.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(NetworkError::from)
    }
}

impl Serialize for VariableValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::File(_) => serializer.serialize_unit(),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut ser = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    ser.serialize_entry(key, value)?;
                }
                ser.end()
            }
            Self::FileList(files) => {
                let mut seq = serializer.serialize_seq(Some(files.len()))?;
                for _ in files.iter() {
                    seq.serialize_element(&())?;
                }
                seq.end()
            }
        }
    }
}

impl From<serde_json::Value> for VariableValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for VariableValue {
                fn from(value: $ty) -> Self {
                    Self::Number(Number::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl From<f64> for VariableValue {
    /// Non-finite floats have no JSON form and become `null`.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<VariableValue>> From<Option<T>> for VariableValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<VariableValue>> From<Vec<T>> for VariableValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, VariableValue>> for VariableValue {
    fn from(map: IndexMap<String, VariableValue>) -> Self {
        Self::Object(map)
    }
}

impl From<UploadFile> for VariableValue {
    fn from(file: UploadFile) -> Self {
        Self::File(file)
    }
}

impl From<FileList> for VariableValue {
    fn from(files: FileList) -> Self {
        Self::FileList(files)
    }
}

impl<K: Into<String>, V: Into<VariableValue>> FromIterator<(K, V)> for VariableValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Object(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// A file held in memory, ready to be sent as a multipart part.
///
/// Contents are reference counted, so cloning an `UploadFile` never copies
/// the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    name: String,
    mime_type: String,
    contents: Bytes,
}

impl UploadFile {
    /// Create a file from its name and contents.
    pub fn new(name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk. The file name is taken from the last path component.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| NetworkError::Io(format!("{}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, contents))
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// The file name sent with the part.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The MIME type sent with the part.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The file contents.
    pub fn contents(&self) -> &Bytes {
        &self.contents
    }

    /// Size of the contents in bytes.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Returns true if the file has no contents.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// An ordered collection of files, e.g. the selection of a multi-file input.
///
/// The collection type itself marks its contents as uploads; an empty list
/// is still an upload value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileList(Vec<UploadFile>);

impl FileList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file.
    pub fn push(&mut self, file: UploadFile) {
        self.0.push(file);
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list holds no files.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the files in order.
    pub fn iter(&self) -> std::slice::Iter<'_, UploadFile> {
        self.0.iter()
    }

    /// Borrow the files as a slice.
    pub fn as_slice(&self) -> &[UploadFile] {
        &self.0
    }

    /// Take the files out of the list.
    pub fn into_vec(self) -> Vec<UploadFile> {
        self.0
    }
}

impl From<Vec<UploadFile>> for FileList {
    fn from(files: Vec<UploadFile>) -> Self {
        Self(files)
    }
}

impl FromIterator<UploadFile> for FileList {
    fn from_iter<I: IntoIterator<Item = UploadFile>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FileList {
    type Item = &'a UploadFile;
    type IntoIter = std::slice::Iter<'a, UploadFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A file referenced by location rather than held in memory.
///
/// Useful where only a path or `file://` URI is at hand. It converts into an
/// object `{uri, type, name}` inside the variables tree, which the default
/// recognizer treats as an upload; the file is read when the request is sent.
///
/// # Example
///
/// ```ignore
/// let avatar = FileDescriptor::new("file:///tmp/avatar.png", "image/png", "avatar.png");
/// let request = GraphQLRequest::mutation("mutation($file: Upload!) { setAvatar(file: $file) }")
///     .variable("file", avatar);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Location of the file: a local path or a `file://` URL.
    pub uri: String,
    /// MIME type of the contents.
    pub mime_type: String,
    /// Display name sent as the part's file name.
    pub name: String,
}

impl FileDescriptor {
    /// Create a descriptor.
    pub fn new(uri: impl Into<String>, mime_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: mime_type.into(),
            name: name.into(),
        }
    }

    /// Read a descriptor back from its object form.
    ///
    /// `uri`, `type` and `name` must all be present as strings.
    pub fn from_value(value: &VariableValue) -> Option<Self> {
        let field = |key| value.get(key).and_then(VariableValue::as_str);
        Some(Self::new(field("uri")?, field("type")?, field("name")?))
    }
}

impl From<FileDescriptor> for VariableValue {
    fn from(descriptor: FileDescriptor) -> Self {
        [
            ("uri", descriptor.uri),
            ("type", descriptor.mime_type),
            ("name", descriptor.name),
        ]
        .into_iter()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_shape() {
        let value = VariableValue::from(json!({
            "id": 1,
            "tags": ["a", "b"],
            "meta": {"draft": true, "note": null}
        }));

        assert_eq!(value.get("id"), Some(&VariableValue::from(1)));
        assert_eq!(value.get("tags").and_then(VariableValue::as_list).map(<[_]>::len), Some(2));
        assert_eq!(
            value.get("meta").and_then(|m| m.get("note")),
            Some(&VariableValue::Null)
        );
    }

    #[test]
    fn test_files_serialize_as_null() {
        let files: FileList = vec![UploadFile::new("a", "1"), UploadFile::new("b", "2")].into();
        let value: VariableValue = [
            ("file", VariableValue::from(UploadFile::new("test", "contents"))),
            ("files", VariableValue::from(files)),
            ("name", VariableValue::from("x")),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"file":null,"files":[null,null],"name":"x"}"#
        );
    }

    #[test]
    fn test_object_keeps_insertion_order() {
        let value: VariableValue = [("z", 1), ("a", 2), ("m", 3)].into_iter().collect();
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(VariableValue::from(f64::NAN), VariableValue::Null);
        assert_eq!(VariableValue::from(1.5).to_json().unwrap(), json!(1.5));
    }

    #[test]
    fn test_descriptor_object_form() {
        let descriptor = FileDescriptor::new("/some/uri", "image/png", "some name");
        let value = VariableValue::from(descriptor.clone());

        assert_eq!(
            value.to_json().unwrap(),
            json!({"uri": "/some/uri", "type": "image/png", "name": "some name"})
        );
        assert_eq!(FileDescriptor::from_value(&value), Some(descriptor));
    }

    #[test]
    fn test_descriptor_needs_every_field() {
        for value in [
            json!({"uri": "/tmp/x"}),
            json!({"uri": "/tmp/x", "type": "text/plain"}),
            json!({"uri": 3, "type": "text/plain", "name": "x"}),
            json!({"uri": "https://example.com/page", "title": "x"}),
        ] {
            assert!(FileDescriptor::from_value(&VariableValue::from(value)).is_none());
        }
    }

    #[test]
    fn test_upload_file_clone_shares_contents() {
        let file = UploadFile::new("a.bin", vec![1u8, 2, 3]).with_mime_type("application/x-test");
        let copy = file.clone();
        assert_eq!(copy.contents().as_ptr(), file.contents().as_ptr());
        assert_eq!(copy.mime_type(), "application/x-test");
        assert_eq!(copy.len(), 3);
    }
}
