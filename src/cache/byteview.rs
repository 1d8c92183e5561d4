//! Byte View Module
//!
//! Immutable, cheaply clonable view over cached bytes.

use std::fmt;

use bytes::Bytes;

// == Byte View ==
/// An immutable view of a cached value.
///
/// Clones share the same underlying buffer; callers cannot mutate the cached
/// copy through a view.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    /// Copies `data` into a new buffer owned by the view.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    /// Returns the length of the view in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the viewed bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns a cheap handle to the shared buffer.
    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(data),
        }
    }
}

impl From<&str> for ByteView {
    fn from(data: &str) -> Self {
        Self::copy_from_slice(data.as_bytes())
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByteView").field(&self.bytes).finish()
    }
}
