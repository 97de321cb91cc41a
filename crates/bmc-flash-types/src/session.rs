use crate::{BlobId, OpenFlags};

/// Which subsystem a session belongs to, and therefore which operations it
/// admits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionRole {
    Upload,
    Hash,
    Verify,
    Version,
}

/// A live handle bound to one open blob.
///
/// Created by `open`, destroyed by `close` or `expire`. `cursor` is not
/// advanced by the core itself (offsets are always caller-supplied) but is
/// kept so a future writeMeta/read implementation that wants an implicit
/// "next offset" has somewhere to put it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub id: u16,
    pub blob_id: BlobId,
    pub flags: OpenFlags,
    pub role: SessionRole,
    pub cursor: u32,
}

impl Session {
    pub fn new(id: u16, blob_id: BlobId, flags: OpenFlags, role: SessionRole) -> Self {
        Self {
            id,
            blob_id,
            flags,
            role,
            cursor: 0,
        }
    }
}
