use bmc_flash_types::BlobId;

/// Which admissibility rules a blob id is subject to (§3 kinds). Kinds are
/// disjoint: a given id belongs to exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FirmwareBlobKind {
    UploadTarget,
    HashTarget,
    Verify,
    ActiveImage,
    ActiveHash,
}

/// Static configuration for one firmware update handler instance.
///
/// `upload_targets` is usually one id (e.g. `/flash/image`) but the source
/// format supports offering several interchangeable targets (legacy image
/// vs. tarball); whichever one is opened first becomes "the" target for the
/// rest of that update cycle.
#[derive(Clone, Debug)]
pub struct FirmwareConfig {
    pub upload_targets: Vec<BlobId>,
    pub hash_blob: BlobId,
    pub verify_blob: BlobId,
    pub active_image_blob: BlobId,
    pub active_hash_blob: BlobId,
    /// Union of transport bits this deployment accepts (subset of
    /// `TRANSPORT_MASK`).
    pub transport_mask: u16,
}

impl FirmwareConfig {
    pub fn kind_of(&self, blob: &BlobId) -> Option<FirmwareBlobKind> {
        if self.upload_targets.contains(blob) {
            return Some(FirmwareBlobKind::UploadTarget);
        }
        if blob == &self.hash_blob {
            return Some(FirmwareBlobKind::HashTarget);
        }
        if blob == &self.verify_blob {
            return Some(FirmwareBlobKind::Verify);
        }
        if blob == &self.active_image_blob {
            return Some(FirmwareBlobKind::ActiveImage);
        }
        if blob == &self.active_hash_blob {
            return Some(FirmwareBlobKind::ActiveHash);
        }
        None
    }
}
