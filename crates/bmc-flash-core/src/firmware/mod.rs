//! Firmware state machine (C7) plus the blob catalog (C6) it drives.
//!
//! This is the core of the crate: a six-state FSM gating which operations
//! are admissible against which blob kind. See the module-level matrix in
//! the design doc for the full (state × operation × kind) table; this file
//! is the executable version of it.

mod config;

pub use config::{FirmwareBlobKind, FirmwareConfig};

use std::collections::HashMap;

use bmc_flash_types::{BlobId, BlobMeta, OpenFlags, Session, SessionRole, VerifyStatus};

use crate::capability::{DataTransport, ImageWriter, VerificationTrigger};
use crate::error::FirmwareError;
use crate::session_table::SessionTable;

/// §3 `UpdateState`. Transitions are monotonic except for the resets
/// documented on [`FirmwareHandler::delete`] and the failed-verification
/// path in [`FirmwareHandler::close`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateState {
    NotYetStarted,
    UploadInProgress,
    VerificationPending,
    VerificationStarted,
    VerificationCompleted,
    UpdateCompleted,
}

pub struct FirmwareHandler {
    config: FirmwareConfig,
    state: UpdateState,
    /// Set once an upload-target session has opened; I3 keeps
    /// `active_image_blob` in the catalog from then on.
    active_image: bool,
    /// Set once the hash-target session has opened; mirrors `active_image`.
    active_hash: bool,
    /// Which upload-target blob "owns" the current/last upload cycle. Reopen
    /// checks for the `UploadTarget` kind are scoped to this id.
    active_upload_target: Option<BlobId>,
    verify_status: VerifyStatus,
    image_writer: Box<dyn ImageWriter>,
    verify_trigger: Box<dyn VerificationTrigger>,
    transports: HashMap<u16, Box<dyn DataTransport>>,
}

impl FirmwareHandler {
    pub fn new(
        config: FirmwareConfig,
        image_writer: Box<dyn ImageWriter>,
        verify_trigger: Box<dyn VerificationTrigger>,
        transports: Vec<Box<dyn DataTransport>>,
    ) -> Self {
        let transports = transports
            .into_iter()
            .map(|t| (t.supported_bit(), t))
            .collect();
        Self {
            config,
            state: UpdateState::NotYetStarted,
            active_image: false,
            active_hash: false,
            active_upload_target: None,
            verify_status: VerifyStatus::Other,
            image_writer,
            verify_trigger,
            transports,
        }
    }

    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// True iff `path` is in the *current* catalog (§4.1), not merely a
    /// statically configured id — `Verify` and the `Active*` markers are
    /// only handleable while they're actually visible (I3/I4).
    pub fn can_handle(&self, path: &BlobId) -> bool {
        self.blob_ids().contains(path)
    }

    fn verify_visible(&self) -> bool {
        matches!(
            self.state,
            UpdateState::VerificationPending
                | UpdateState::VerificationStarted
                | UpdateState::VerificationCompleted
        )
    }

    /// C6: the catalog is a pure function of `state` plus which sides
    /// (image/hash) have ever been uploaded this cycle.
    pub fn blob_ids(&self) -> Vec<BlobId> {
        let mut ids = self.config.upload_targets.clone();
        ids.push(self.config.hash_blob.clone());
        if self.active_image {
            ids.push(self.config.active_image_blob.clone());
        }
        if self.active_hash {
            ids.push(self.config.active_hash_blob.clone());
        }
        if self.verify_visible() {
            ids.push(self.config.verify_blob.clone());
        }
        ids
    }

    /// `stat(path)`: the no-session overload. Always succeeds for
    /// upload/hash targets; only succeeds for `Verify` when a session is
    /// currently open against it, and never succeeds for the `Active*`
    /// markers (I3: they are never openable, so no session can exist).
    pub fn stat_blob(&self, sessions: &SessionTable, path: &BlobId) -> Option<BlobMeta> {
        match self.config.kind_of(path)? {
            FirmwareBlobKind::UploadTarget | FirmwareBlobKind::HashTarget => {
                let blob_state = match sessions.session_for_blob(path) {
                    Some(session) => session.flags.bits(),
                    None => self.config.transport_mask,
                };
                Some(BlobMeta::new(0, blob_state, Vec::new()))
            }
            FirmwareBlobKind::Verify => {
                let session = sessions.session_for_blob(path)?;
                Some(BlobMeta::new(0, session.flags.bits(), Vec::new()))
            }
            FirmwareBlobKind::ActiveImage | FirmwareBlobKind::ActiveHash => None,
        }
    }

    /// `stat(session)`: for a `Verify` session this polls the verification
    /// trigger and may record the `VerificationStarted` ->
    /// `VerificationCompleted` transition.
    #[tracing::instrument(skip(self, sessions))]
    pub fn stat_session(&mut self, sessions: &SessionTable, id: u16) -> Option<BlobMeta> {
        let session = sessions.get(id)?;
        if session.blob_id != self.config.verify_blob {
            return Some(BlobMeta::new(0, session.flags.bits(), Vec::new()));
        }

        let status = if self.state == UpdateState::VerificationPending {
            VerifyStatus::Other
        } else {
            let polled = self.verify_trigger.check_verification_state();
            self.verify_status = polled;
            if polled.is_terminal() && self.state == UpdateState::VerificationStarted {
                tracing::info!(?polled, "verification reached a terminal state");
                self.state = UpdateState::VerificationCompleted;
            }
            polled
        };
        Some(BlobMeta::new(0, session.flags.bits(), vec![status.as_byte()]))
    }

    #[tracing::instrument(skip(self, sessions, flags))]
    pub fn open(
        &mut self,
        sessions: &mut SessionTable,
        id: u16,
        flags: OpenFlags,
        path: &BlobId,
    ) -> Result<(), FirmwareError> {
        if sessions.contains_id(id) {
            return Err(FirmwareError::SessionInUse(id));
        }
        let kind = self
            .config
            .kind_of(path)
            .ok_or_else(|| FirmwareError::UnknownBlob(path.clone()))?;
        if sessions.is_blob_open(path) {
            return Err(FirmwareError::BlobAlreadyOpen(path.clone()));
        }

        match kind {
            FirmwareBlobKind::UploadTarget | FirmwareBlobKind::HashTarget => {
                self.open_upload_like(sessions, id, flags, path, kind)
            }
            FirmwareBlobKind::Verify => self.open_verify(sessions, id, flags, path),
            FirmwareBlobKind::ActiveImage | FirmwareBlobKind::ActiveHash => {
                // I3: never openable, in any state.
                Err(FirmwareError::StateDenied(self.state))
            }
        }
    }

    fn validate_upload_flags(&self, flags: OpenFlags, path: &BlobId) -> Result<(), FirmwareError> {
        if flags.has_unknown_bits() || !flags.can_write() || !flags.has_single_transport() {
            return Err(FirmwareError::InvalidFlags {
                flags: flags.bits(),
                blob: path.clone(),
            });
        }
        if flags.transport_bits() & self.config.transport_mask == 0 {
            return Err(FirmwareError::InvalidFlags {
                flags: flags.bits(),
                blob: path.clone(),
            });
        }
        Ok(())
    }

    fn open_upload_like(
        &mut self,
        sessions: &mut SessionTable,
        id: u16,
        flags: OpenFlags,
        path: &BlobId,
        kind: FirmwareBlobKind,
    ) -> Result<(), FirmwareError> {
        self.validate_upload_flags(flags, path)?;

        let allowed = match self.state {
            UpdateState::NotYetStarted => true,
            UpdateState::UploadInProgress => match kind {
                // "allow only same target": a rival upload-target blob may
                // not be opened mid-upload; the hash companion has no
                // rivals (I1 already guarantees at most one hash session).
                FirmwareBlobKind::UploadTarget => {
                    self.active_upload_target.as_ref() == Some(path)
                }
                _ => true,
            },
            UpdateState::VerificationPending => match kind {
                FirmwareBlobKind::UploadTarget => {
                    self.active_upload_target.as_ref() == Some(path)
                }
                _ => true,
            },
            _ => false,
        };
        if !allowed {
            return Err(FirmwareError::StateDenied(self.state));
        }

        if !self.image_writer.open(path) {
            return Err(FirmwareError::CapabilityFailed);
        }

        match kind {
            FirmwareBlobKind::UploadTarget => {
                self.active_image = true;
                self.active_upload_target = Some(path.clone());
            }
            FirmwareBlobKind::HashTarget => self.active_hash = true,
            _ => unreachable!("open_upload_like only called for UploadTarget/HashTarget"),
        }
        self.state = UpdateState::UploadInProgress;

        let role = match kind {
            FirmwareBlobKind::UploadTarget => SessionRole::Upload,
            _ => SessionRole::Hash,
        };
        sessions.insert(Session::new(id, path.clone(), flags, role));
        Ok(())
    }

    fn open_verify(
        &mut self,
        sessions: &mut SessionTable,
        id: u16,
        flags: OpenFlags,
        path: &BlobId,
    ) -> Result<(), FirmwareError> {
        if flags.has_unknown_bits() {
            return Err(FirmwareError::InvalidFlags {
                flags: flags.bits(),
                blob: path.clone(),
            });
        }
        if !self.verify_visible() {
            return Err(FirmwareError::StateDenied(self.state));
        }
        sessions.insert(Session::new(id, path.clone(), flags, SessionRole::Verify));
        Ok(())
    }

    pub fn read(&self, sessions: &SessionTable, id: u16, offset: u32, size: u32) -> Vec<u8> {
        // Verify and upload/hash sessions are all write-oriented or
        // status-only; the firmware subsystem has no readable payload.
        let _ = (sessions.get(id), offset, size);
        Vec::new()
    }

    pub fn write(&mut self, sessions: &SessionTable, id: u16, offset: u32, data: &[u8]) -> bool {
        let Some(session) = sessions.get(id) else {
            return false;
        };
        match session.role {
            SessionRole::Upload | SessionRole::Hash => self.image_writer.write(offset, data),
            SessionRole::Verify | SessionRole::Version => false,
        }
    }

    pub fn write_meta(
        &mut self,
        sessions: &SessionTable,
        id: u16,
        offset: u32,
        data: &[u8],
    ) -> bool {
        let Some(session) = sessions.get(id) else {
            return false;
        };
        match session.role {
            SessionRole::Upload | SessionRole::Hash => {
                let bit = session.flags.transport_bits();
                match self.transports.get_mut(&bit) {
                    Some(transport) => transport.write_meta(offset, data),
                    None => false,
                }
            }
            SessionRole::Verify | SessionRole::Version => false,
        }
    }

    #[tracing::instrument(skip(self, sessions, data))]
    pub fn commit(&mut self, sessions: &SessionTable, id: u16, data: &[u8]) -> bool {
        let _ = data;
        let Some(session) = sessions.get(id) else {
            return false;
        };
        if session.role != SessionRole::Verify || self.state != UpdateState::VerificationPending {
            return false;
        }
        if self.verify_trigger.trigger_verification() {
            self.state = UpdateState::VerificationStarted;
            true
        } else {
            tracing::warn!("verification trigger rejected commit, staying in VerificationPending");
            false
        }
    }

    #[tracing::instrument(skip(self, sessions))]
    pub fn close(&mut self, sessions: &mut SessionTable, id: u16) -> bool {
        let Some(session) = sessions.get(id).cloned() else {
            return false;
        };
        match session.role {
            SessionRole::Upload | SessionRole::Hash => {
                self.image_writer.close();
                if self.state == UpdateState::UploadInProgress {
                    self.state = UpdateState::VerificationPending;
                }
            }
            SessionRole::Verify => {
                if self.state == UpdateState::VerificationCompleted {
                    if self.verify_status == VerifyStatus::Success {
                        self.state = UpdateState::UpdateCompleted;
                    } else {
                        self.reset();
                    }
                }
                // VerificationPending/VerificationStarted: release only, no
                // transition (closing without having committed "stays").
            }
            SessionRole::Version => unreachable!("version sessions never route here"),
        }
        sessions.remove(id);
        true
    }

    /// `expire` is specified as equivalent to `close`, initiated by the
    /// timeout layer rather than the peer.
    pub fn expire(&mut self, sessions: &mut SessionTable, id: u16) -> bool {
        self.close(sessions, id)
    }

    /// `delete(path)` is explicitly left TODO in the source for the
    /// verification states; this implementation only defines the one case
    /// that reads unambiguously from the matrix (abort an in-flight or
    /// completed-but-failed verification) and otherwise declines rather
    /// than guess. See DESIGN.md.
    pub fn delete(&mut self, path: &BlobId) -> bool {
        if path != &self.config.verify_blob {
            return false;
        }
        match self.state {
            UpdateState::VerificationPending | UpdateState::VerificationCompleted => {
                self.verify_trigger.abort_verification();
                self.reset();
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.state = UpdateState::NotYetStarted;
        self.active_image = false;
        self.active_hash = false;
        self.active_upload_target = None;
        self.verify_status = VerifyStatus::Other;
    }
}

#[cfg(test)]
mod proptests;
