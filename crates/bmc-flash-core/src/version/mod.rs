//! Version handler (C8): a uniform multi-blob read-only surface over
//! "trigger a probe, then poll for completion" capabilities.

use std::collections::HashMap;

use bmc_flash_types::{ActionStatus, BlobId, BlobMeta, OpenFlags, Session, SessionRole};

use crate::capability::{VersionImageSource, VersionTrigger};
use crate::constants::VERSION_PAYLOAD_READ_CAP;
use crate::error::VersionError;
use crate::session_table::SessionTable;

struct VersionEntry {
    trigger: Box<dyn VersionTrigger>,
    image_source: Box<dyn VersionImageSource>,
    /// Most recently polled status; cached so `stat` can report it without
    /// re-polling on every call.
    status: ActionStatus,
    /// Materialized once the trigger reports success. There is no
    /// size-query hook on `VersionImageSource`, so the whole (small)
    /// payload is read in one shot the first time it's needed.
    payload: Option<Vec<u8>>,
}

impl VersionEntry {
    fn new(trigger: Box<dyn VersionTrigger>, image_source: Box<dyn VersionImageSource>) -> Self {
        Self {
            trigger,
            image_source,
            status: ActionStatus::Unknown,
            payload: None,
        }
    }
}

pub struct VersionHandler {
    entries: HashMap<BlobId, VersionEntry>,
}

impl VersionHandler {
    pub fn new(
        entries: Vec<(BlobId, Box<dyn VersionTrigger>, Box<dyn VersionImageSource>)>,
    ) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(id, trigger, source)| (id, VersionEntry::new(trigger, source)))
                .collect(),
        }
    }

    pub fn can_handle(&self, path: &BlobId) -> bool {
        self.entries.contains_key(path)
    }

    pub fn blob_ids(&self) -> Vec<BlobId> {
        self.entries.keys().cloned().collect()
    }

    #[tracing::instrument(skip(self, sessions, flags))]
    pub fn open(
        &mut self,
        sessions: &mut SessionTable,
        id: u16,
        flags: OpenFlags,
        path: &BlobId,
    ) -> Result<(), VersionError> {
        if sessions.contains_id(id) {
            return Err(VersionError::SessionInUse(id));
        }
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| VersionError::UnknownBlob(path.clone()))?;

        if flags.has_unknown_bits() || !flags.can_read() || flags.can_write() || flags.transport_bits() != 0 {
            return Err(VersionError::InvalidFlags {
                flags: flags.bits(),
                blob: path.clone(),
            });
        }
        if sessions.is_blob_open(path) {
            return Err(VersionError::BlobAlreadyOpen(path.clone()));
        }

        if !entry.trigger.trigger() {
            // Leaves the blob available for retry, per §4.4.
            return Err(VersionError::TriggerFailed(path.clone()));
        }
        entry.status = ActionStatus::Unknown;
        entry.payload = None;
        sessions.insert(Session::new(id, path.clone(), flags, SessionRole::Version));
        Ok(())
    }

    pub fn stat_blob(&self, path: &BlobId) -> Option<BlobMeta> {
        let entry = self.entries.get(path)?;
        let size = entry.payload.as_ref().map_or(0, |p| p.len() as u32);
        Some(BlobMeta::new(size, u16::from(entry.status.as_byte()), Vec::new()))
    }

    pub fn stat_session(&self, sessions: &SessionTable, id: u16) -> Option<BlobMeta> {
        let session = sessions.get(id)?;
        self.stat_blob(&session.blob_id)
    }

    /// Polls the trigger, lazily materializes the payload on first success,
    /// and returns the requested slice clamped to the payload bound.
    #[tracing::instrument(skip(self, sessions))]
    pub fn read(&mut self, sessions: &SessionTable, id: u16, offset: u32, size: u32) -> Vec<u8> {
        let Some(session) = sessions.get(id) else {
            return Vec::new();
        };
        let Some(entry) = self.entries.get_mut(&session.blob_id) else {
            return Vec::new();
        };

        entry.status = entry.trigger.status();
        match entry.status {
            ActionStatus::Running | ActionStatus::Unknown => Vec::new(),
            ActionStatus::Failed => Vec::new(),
            ActionStatus::Success => {
                if entry.payload.is_none() {
                    if !entry.image_source.open(&session.blob_id) {
                        return Vec::new();
                    }
                    let buf = entry
                        .image_source
                        .read(0, VERSION_PAYLOAD_READ_CAP);
                    entry.payload = Some(buf);
                }
                let payload = entry.payload.as_ref().expect("just populated");
                slice_clamped(payload, offset, size)
            }
        }
    }

    #[tracing::instrument(skip(self, sessions))]
    pub fn close(&mut self, sessions: &mut SessionTable, id: u16) -> bool {
        let Some(session) = sessions.remove(id) else {
            return false;
        };
        if let Some(entry) = self.entries.get_mut(&session.blob_id) {
            entry.image_source.close();
            entry.payload = None;
            entry.status = ActionStatus::Unknown;
        }
        true
    }

    /// Equivalent to `close`, per §4.1.
    pub fn expire(&mut self, sessions: &mut SessionTable, id: u16) -> bool {
        self.close(sessions, id)
    }
}

fn slice_clamped(payload: &[u8], offset: u32, size: u32) -> Vec<u8> {
    let offset = offset as usize;
    if offset >= payload.len() {
        return Vec::new();
    }
    let end = offset.saturating_add(size as usize).min(payload.len());
    payload[offset..end].to_vec()
}
