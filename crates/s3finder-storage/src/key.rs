//! Object keys.
//!
//! A key is the user-supplied file name, passed to the backend verbatim.
//! It is never trimmed or normalized. Keys with `.` or `..` path segments
//! are rejected: HTTP clients collapse those segments before sending the
//! request, so a signed link for such a key could never be followed.

use std::fmt;

use crate::error::{StorageError, StorageResult};

/// Maximum key length in bytes of UTF-8 (S3 limit).
pub const MAX_KEY_BYTES: usize = 1024;

/// An opaque, untrusted object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Parse a user-supplied file name into a key.
    ///
    /// Rejects the empty string (the probe would address the bucket itself),
    /// keys longer than [`MAX_KEY_BYTES`] and keys with dot segments.
    pub fn parse(raw: &str) -> StorageResult<Self> {
        if raw.is_empty() {
            return Err(StorageError::invalid_key("key is empty"));
        }
        if raw.len() > MAX_KEY_BYTES {
            return Err(StorageError::invalid_key(format!(
                "key is {} bytes, limit is {}",
                raw.len(),
                MAX_KEY_BYTES
            )));
        }
        if raw.split('/').any(|segment| segment == "." || segment == "..") {
            return Err(StorageError::invalid_key(
                "key contains a '.' or '..' path segment",
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Content-Disposition` value that forces a download named after the key.
    ///
    /// ASCII keys produce `attachment; filename="<key>"` with `"` and `\`
    /// escaped. Keys with other characters get an ASCII fallback plus an
    /// RFC 5987 `filename*` parameter carrying the exact name.
    pub fn content_disposition(&self) -> String {
        let quoted = quote_filename(&self.0);
        if self.0.is_ascii() && !self.0.chars().any(|c| c.is_ascii_control()) {
            return format!("attachment; filename=\"{}\"", quoted);
        }

        let fallback: String = quoted
            .chars()
            .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
            .collect();
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(&self.0)
        )
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn quote_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
