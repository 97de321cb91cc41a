//! Session table (C5): enforces I1 (one session per blob) and I2 (globally
//! unique session ids) across both the firmware and version subsystems.

use std::collections::HashMap;

use bmc_flash_types::{BlobId, Session};

#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<u16, Session>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// I2: is this session id already live?
    pub fn contains_id(&self, id: u16) -> bool {
        self.sessions.contains_key(&id)
    }

    /// I1: is some session already open against this blob?
    pub fn is_blob_open(&self, blob_id: &BlobId) -> bool {
        self.sessions.values().any(|s| &s.blob_id == blob_id)
    }

    pub fn session_for_blob(&self, blob_id: &BlobId) -> Option<&Session> {
        self.sessions.values().find(|s| &s.blob_id == blob_id)
    }

    pub fn get(&self, id: u16) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: u16) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Caller must have already checked `contains_id`/`is_blob_open`; this
    /// never overwrites an existing entry.
    pub fn insert(&mut self, session: Session) {
        debug_assert!(!self.sessions.contains_key(&session.id));
        self.sessions.insert(session.id, session);
    }

    pub fn remove(&mut self, id: u16) -> Option<Session> {
        self.sessions.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
