use std::fmt;

/// Opaque name of a blob exposed through the handler facade.
///
/// `BlobId` is a thin wrapper over an owned string rather than a borrowed
/// `&str` so that it can be stored in session records and catalog snapshots
/// without tying their lifetime to a caller-owned buffer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct BlobId(String);

impl BlobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlobId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BlobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for BlobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
