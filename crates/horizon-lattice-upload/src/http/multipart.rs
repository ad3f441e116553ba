//! `multipart/form-data` bodies.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};

/// An ordered multipart body.
///
/// Parts go out in the order they are added, and a name may repeat.
#[derive(Debug, Default)]
pub struct MultipartForm {
    inner: Form,
    len: usize,
}

impl MultipartForm {
    /// An empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text part.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner = self.inner.text(name.into(), value.into());
        self.len += 1;
        self
    }

    /// Append a file part.
    ///
    /// An unparsable `mime_type` is logged and the part goes out without a
    /// `Content-Type`.
    pub fn file_bytes(
        mut self,
        name: impl Into<String>,
        contents: impl Into<Bytes>,
        file_name: impl Into<String>,
        mime_type: Option<&str>,
    ) -> Self {
        let contents: Bytes = contents.into();
        let file_name: String = file_name.into();
        let part = match mime_type {
            Some(mime) => match file_part(contents.clone(), file_name.clone()).mime_str(mime) {
                Ok(part) => part,
                Err(e) => {
                    tracing::warn!(target: "horizon_lattice_upload::http", mime, file_name = file_name.as_str(), "dropping invalid MIME type: {}", e);
                    file_part(contents, file_name)
                }
            },
            None => file_part(contents, file_name),
        };
        self.inner = self.inner.part(name.into(), part);
        self.len += 1;
        self
    }

    /// Number of parts added.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no parts were added.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn into_reqwest(self) -> Form {
        self.inner
    }
}

// `Bytes` clones are reference counted, so a rebuilt part shares the buffer.
fn file_part(contents: Bytes, file_name: String) -> Part {
    let len = contents.len() as u64;
    Part::stream_with_length(contents, len).file_name(file_name)
}
