/// Snapshot returned by the facade's `stat` operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlobMeta {
    pub size: u32,
    /// Echoes the flags associated with the blob (transport + r/w), plus any
    /// extra state bits a handler chooses to surface (e.g. a polled status
    /// byte packed into `metadata` rather than here).
    pub blob_state: u16,
    pub metadata: Vec<u8>,
}

impl BlobMeta {
    pub fn new(size: u32, blob_state: u16, metadata: Vec<u8>) -> Self {
        Self {
            size,
            blob_state,
            metadata,
        }
    }
}
