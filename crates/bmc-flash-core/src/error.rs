use bmc_flash_types::BlobId;

/// The error categories called out in the handling design: every variant
/// below belongs to exactly one, and the boundary is where they all get
/// collapsed to `false` / empty bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    State,
    Capability,
}

/// Internal error type for the firmware state machine (C7) and the
/// dispatcher checks (C9) that sit in front of it.
///
/// Mirrors the reference handler's pattern of carrying a rich internal error
/// that a `From` impl collapses to the caller-visible contract — here that
/// contract is `bool`/`Vec<u8>` rather than a result enum, but the shape of
/// the conversion is the same.
#[derive(Debug, thiserror::Error)]
pub enum FirmwareError {
    #[error("unknown blob: {0}")]
    UnknownBlob(BlobId),
    #[error("session {0} is already in use")]
    SessionInUse(u16),
    #[error("blob already open: {0}")]
    BlobAlreadyOpen(BlobId),
    #[error("invalid flags {flags:#06x} for blob {blob}")]
    InvalidFlags { flags: u16, blob: BlobId },
    #[error("operation not admissible in state {0:?}")]
    StateDenied(crate::firmware::UpdateState),
    #[error("capability call failed")]
    CapabilityFailed,
}

impl FirmwareError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FirmwareError::UnknownBlob(_)
            | FirmwareError::SessionInUse(_)
            | FirmwareError::BlobAlreadyOpen(_)
            | FirmwareError::InvalidFlags { .. } => ErrorKind::Structural,
            FirmwareError::StateDenied(_) => ErrorKind::State,
            FirmwareError::CapabilityFailed => ErrorKind::Capability,
        }
    }
}

/// Internal error type for the version handler (C8).
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("unknown version blob: {0}")]
    UnknownBlob(BlobId),
    #[error("session {0} is already in use")]
    SessionInUse(u16),
    #[error("blob already open: {0}")]
    BlobAlreadyOpen(BlobId),
    #[error("invalid flags {flags:#06x} for version blob {blob}: only read is meaningful")]
    InvalidFlags { flags: u16, blob: BlobId },
    #[error("trigger failed for blob {0}")]
    TriggerFailed(BlobId),
}

impl VersionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VersionError::UnknownBlob(_)
            | VersionError::SessionInUse(_)
            | VersionError::BlobAlreadyOpen(_)
            | VersionError::InvalidFlags { .. } => ErrorKind::Structural,
            VersionError::TriggerFailed(_) => ErrorKind::Capability,
        }
    }
}
