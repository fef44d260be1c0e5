//! Represents an object (blob) addressed in the served bucket.

use std::fmt;

/// Document served for any path ending in `/`.
pub const INDEX_DOCUMENT: &str = "index.html";

/// Content type used when the store reports none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Storage key of a single object within the served bucket.
///
/// Built from a request path by [`ObjectKey::resolve`]; never empty for a
/// path that went through resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Map a request path to an object key.
    ///
    /// Strips exactly one leading `/` and appends [`INDEX_DOCUMENT`] when
    /// what remains ends with `/` or is empty (the root). No other
    /// normalization happens here.
    pub fn resolve(raw_path: &str) -> Self {
        let trimmed = raw_path.strip_prefix('/').unwrap_or(raw_path);
        let mut key = trimmed.to_string();
        if key.is_empty() || key.ends_with('/') {
            key.push_str(INDEX_DOCUMENT);
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
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

/// Attributes reported by the store for one object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Content type (MIME type), passed through to the client as-is.
    pub content_type: String,

    /// Size in bytes.
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_plain_file_path() {
        assert_eq!(ObjectKey::resolve("/a/b.txt").as_str(), "a/b.txt");
        assert_eq!(ObjectKey::resolve("/index.html").as_str(), "index.html");
    }

    #[test]
    fn resolves_directory_to_index_document() {
        assert_eq!(ObjectKey::resolve("/a/b/").as_str(), "a/b/index.html");
        assert_eq!(ObjectKey::resolve("/").as_str(), "index.html");
    }

    #[test]
    fn empty_path_yields_index_document() {
        assert_eq!(ObjectKey::resolve("").as_str(), "index.html");
    }

    #[test]
    fn strips_only_one_leading_separator() {
        assert_eq!(ObjectKey::resolve("//a").as_str(), "/a");
        assert_eq!(ObjectKey::resolve("//").as_str(), "/index.html");
    }

    #[test]
    fn leaves_traversal_segments_untouched() {
        assert_eq!(ObjectKey::resolve("/a/../b").as_str(), "a/../b");
    }
}
