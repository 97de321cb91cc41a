//! In-memory fakes for the capability traits, shared by the unit tests in
//! `firmware`, `version`, and `dispatcher`. Not part of the public API.

use std::cell::RefCell;
use std::rc::Rc;

use bmc_flash_types::{ActionStatus, BlobId, VerifyStatus, TRANSPORT_BT};

use crate::capability::{DataTransport, ImageWriter, VerificationTrigger, VersionImageSource, VersionTrigger};
use crate::constants::{
    ACTIVE_HASH_BLOB_ID, ACTIVE_IMAGE_BLOB_ID, HASH_BLOB_ID, IMAGE_BLOB_ID, VERIFY_BLOB_ID,
};
use crate::firmware::{FirmwareConfig, FirmwareHandler};
use crate::version::VersionHandler;

#[derive(Debug)]
pub struct ImageWriterState {
    pub opens: Vec<BlobId>,
    pub writes: Vec<(u32, Vec<u8>)>,
    pub closes: u32,
    pub open_result: bool,
}

impl Default for ImageWriterState {
    fn default() -> Self {
        Self {
            opens: Vec::new(),
            writes: Vec::new(),
            closes: 0,
            open_result: true,
        }
    }
}

pub struct FakeImageWriter(pub Rc<RefCell<ImageWriterState>>);

impl ImageWriter for FakeImageWriter {
    fn open(&mut self, blob_id: &BlobId) -> bool {
        let mut s = self.0.borrow_mut();
        s.opens.push(blob_id.clone());
        s.open_result
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> bool {
        self.0.borrow_mut().writes.push((offset, data.to_vec()));
        true
    }

    fn close(&mut self) {
        self.0.borrow_mut().closes += 1;
    }
}

#[derive(Debug)]
pub struct VerifyTriggerState {
    pub trigger_result: bool,
    pub status: VerifyStatus,
    pub triggered: u32,
    pub aborted: u32,
}

impl Default for VerifyTriggerState {
    fn default() -> Self {
        Self {
            trigger_result: true,
            status: VerifyStatus::Running,
            triggered: 0,
            aborted: 0,
        }
    }
}

pub struct FakeVerifyTrigger(pub Rc<RefCell<VerifyTriggerState>>);

impl VerificationTrigger for FakeVerifyTrigger {
    fn trigger_verification(&mut self) -> bool {
        let mut s = self.0.borrow_mut();
        s.triggered += 1;
        s.trigger_result
    }

    fn check_verification_state(&mut self) -> VerifyStatus {
        self.0.borrow().status
    }

    fn abort_verification(&mut self) {
        self.0.borrow_mut().aborted += 1;
    }
}

pub struct FakeTransport(pub u16);

impl DataTransport for FakeTransport {
    fn supported_bit(&self) -> u16 {
        self.0
    }

    fn write_meta(&mut self, _offset: u32, _data: &[u8]) -> bool {
        true
    }

    fn ingest(&mut self, _offset: u32, _data: &[u8]) -> bool {
        true
    }

    fn finalize(&mut self) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct VersionTriggerState {
    pub trigger_result: bool,
    pub status: ActionStatus,
    pub triggered: u32,
}

impl Default for VersionTriggerState {
    fn default() -> Self {
        Self {
            trigger_result: true,
            status: ActionStatus::Running,
            triggered: 0,
        }
    }
}

pub struct FakeVersionTrigger(pub Rc<RefCell<VersionTriggerState>>);

impl VersionTrigger for FakeVersionTrigger {
    fn trigger(&mut self) -> bool {
        let mut s = self.0.borrow_mut();
        s.triggered += 1;
        s.trigger_result
    }

    fn status(&mut self) -> ActionStatus {
        self.0.borrow().status
    }

    fn abort(&mut self) {}
}

pub struct FakeVersionImageSource(pub Vec<u8>);

impl VersionImageSource for FakeVersionImageSource {
    fn open(&mut self, _blob_id: &BlobId) -> bool {
        true
    }

    fn read(&mut self, offset: u32, size: u32) -> Vec<u8> {
        let offset = offset as usize;
        if offset >= self.0.len() {
            return Vec::new();
        }
        let end = offset.saturating_add(size as usize).min(self.0.len());
        self.0[offset..end].to_vec()
    }

    fn close(&mut self) {}
}

/// A single upload-target firmware config (`/flash/image` only) behind one
/// transport bit, wired to fakes whose shared state the caller can inspect
/// and mutate via the returned handles.
pub fn firmware_harness() -> (
    FirmwareHandler,
    Rc<RefCell<ImageWriterState>>,
    Rc<RefCell<VerifyTriggerState>>,
) {
    let writer_state = Rc::new(RefCell::new(ImageWriterState::default()));
    let trigger_state = Rc::new(RefCell::new(VerifyTriggerState::default()));

    let config = FirmwareConfig {
        upload_targets: vec![BlobId::new(IMAGE_BLOB_ID)],
        hash_blob: BlobId::new(HASH_BLOB_ID),
        verify_blob: BlobId::new(VERIFY_BLOB_ID),
        active_image_blob: BlobId::new(ACTIVE_IMAGE_BLOB_ID),
        active_hash_blob: BlobId::new(ACTIVE_HASH_BLOB_ID),
        transport_mask: TRANSPORT_BT,
    };
    let handler = FirmwareHandler::new(
        config,
        Box::new(FakeImageWriter(writer_state.clone())),
        Box::new(FakeVerifyTrigger(trigger_state.clone())),
        vec![Box::new(FakeTransport(TRANSPORT_BT))],
    );
    (handler, writer_state, trigger_state)
}

pub fn version_harness(
    ids: &[&str],
) -> (
    VersionHandler,
    Vec<Rc<RefCell<VersionTriggerState>>>,
) {
    let mut states = Vec::new();
    let mut entries = Vec::new();
    for id in ids {
        let state = Rc::new(RefCell::new(VersionTriggerState::default()));
        states.push(state.clone());
        entries.push((
            BlobId::new(*id),
            Box::new(FakeVersionTrigger(state)) as Box<dyn VersionTrigger>,
            Box::new(FakeVersionImageSource(b"v1.2.3".to_vec())) as Box<dyn VersionImageSource>,
        ));
    }
    (VersionHandler::new(entries), states)
}
