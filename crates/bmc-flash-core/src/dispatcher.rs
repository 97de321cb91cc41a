//! Blob operation dispatcher (C9): the public facade. Routes each operation
//! to the firmware or version subsystem and owns the cross-cutting checks
//! (I2 session-id uniqueness, "is this blob known at all") that apply
//! before either subsystem gets a say.

use bmc_flash_types::{BlobId, BlobMeta, OpenFlags, SessionRole};

use crate::firmware::FirmwareHandler;
use crate::session_table::SessionTable;
use crate::version::VersionHandler;

pub struct BlobDispatcher {
    firmware: FirmwareHandler,
    version: VersionHandler,
    sessions: SessionTable,
}

impl BlobDispatcher {
    pub fn new(firmware: FirmwareHandler, version: VersionHandler) -> Self {
        Self {
            firmware,
            version,
            sessions: SessionTable::new(),
        }
    }

    pub fn firmware(&self) -> &FirmwareHandler {
        &self.firmware
    }

    pub fn can_handle_blob(&self, path: &BlobId) -> bool {
        self.firmware.can_handle(path) || self.version.can_handle(path)
    }

    pub fn blob_ids(&self) -> Vec<BlobId> {
        let mut ids = self.firmware.blob_ids();
        ids.extend(self.version.blob_ids());
        ids
    }

    pub fn stat_blob(&self, path: &BlobId) -> Option<BlobMeta> {
        self.firmware
            .stat_blob(&self.sessions, path)
            .or_else(|| self.version.stat_blob(path))
    }

    pub fn stat_session(&mut self, id: u16) -> Option<BlobMeta> {
        let role = self.sessions.get(id)?.role;
        match role {
            SessionRole::Version => self.version.stat_session(&self.sessions, id),
            _ => self.firmware.stat_session(&self.sessions, id),
        }
    }

    #[tracing::instrument(skip(self, flags))]
    pub fn open(&mut self, id: u16, flags: OpenFlags, path: &BlobId) -> bool {
        // I2 (global session-id uniqueness) is enforced inside each
        // subsystem's own `open`, against the table shared by both.
        if self.firmware.can_handle(path) {
            match self.firmware.open(&mut self.sessions, id, flags, path) {
                Ok(()) => true,
                Err(err) => {
                    tracing::debug!(%err, blob = %path, "firmware open rejected");
                    false
                }
            }
        } else if self.version.can_handle(path) {
            match self.version.open(&mut self.sessions, id, flags, path) {
                Ok(()) => true,
                Err(err) => {
                    tracing::debug!(%err, blob = %path, "version open rejected");
                    false
                }
            }
        } else {
            false
        }
    }

    pub fn read(&mut self, id: u16, offset: u32, size: u32) -> Vec<u8> {
        let Some(role) = self.sessions.get(id).map(|s| s.role) else {
            return Vec::new();
        };
        match role {
            SessionRole::Version => self.version.read(&self.sessions, id, offset, size),
            _ => self.firmware.read(&self.sessions, id, offset, size),
        }
    }

    pub fn write(&mut self, id: u16, offset: u32, data: &[u8]) -> bool {
        let Some(role) = self.sessions.get(id).map(|s| s.role) else {
            return false;
        };
        match role {
            SessionRole::Version => false,
            _ => self.firmware.write(&self.sessions, id, offset, data),
        }
    }

    pub fn write_meta(&mut self, id: u16, offset: u32, data: &[u8]) -> bool {
        let Some(role) = self.sessions.get(id).map(|s| s.role) else {
            return false;
        };
        match role {
            SessionRole::Version => false,
            _ => self.firmware.write_meta(&self.sessions, id, offset, data),
        }
    }

    pub fn commit(&mut self, id: u16, data: &[u8]) -> bool {
        let Some(role) = self.sessions.get(id).map(|s| s.role) else {
            return false;
        };
        match role {
            SessionRole::Verify => self.firmware.commit(&self.sessions, id, data),
            _ => false,
        }
    }

    pub fn close(&mut self, id: u16) -> bool {
        let Some(role) = self.sessions.get(id).map(|s| s.role) else {
            return false;
        };
        match role {
            SessionRole::Version => self.version.close(&mut self.sessions, id),
            _ => self.firmware.close(&mut self.sessions, id),
        }
    }

    /// Initiated by the timeout layer rather than the peer; identical
    /// routing to `close`.
    pub fn expire(&mut self, id: u16) -> bool {
        let Some(role) = self.sessions.get(id).map(|s| s.role) else {
            return false;
        };
        match role {
            SessionRole::Version => self.version.expire(&mut self.sessions, id),
            _ => self.firmware.expire(&mut self.sessions, id),
        }
    }

    pub fn delete(&mut self, path: &BlobId) -> bool {
        self.firmware.delete(path)
    }
}

#[cfg(test)]
mod tests;
#[cfg(test)]
mod proptests;
