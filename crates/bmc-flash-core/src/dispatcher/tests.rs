use bmc_flash_types::{BlobId, OpenFlags, FLAG_READ, FLAG_WRITE, TRANSPORT_BT};

use super::BlobDispatcher;
use crate::testing::{firmware_harness, version_harness};

fn upload_flags() -> OpenFlags {
    OpenFlags::from_bits(FLAG_WRITE | TRANSPORT_BT)
}

fn read_flags() -> OpenFlags {
    OpenFlags::from_bits(FLAG_READ)
}

fn dispatcher() -> BlobDispatcher {
    let (firmware, _writer, _trigger) = firmware_harness();
    let (version, _states) = version_harness(&["/version/bmc"]);
    BlobDispatcher::new(firmware, version)
}

#[test]
fn blob_ids_combine_both_subsystems() {
    let dispatcher = dispatcher();
    let ids: std::collections::HashSet<_> = dispatcher.blob_ids().into_iter().collect();
    assert!(ids.contains(&BlobId::new(crate::constants::IMAGE_BLOB_ID)));
    assert!(ids.contains(&BlobId::new("/version/bmc")));
}

#[test]
fn i2_session_id_is_unique_across_subsystems() {
    let mut dispatcher = dispatcher();
    let image = BlobId::new(crate::constants::IMAGE_BLOB_ID);
    let version_blob = BlobId::new("/version/bmc");

    assert!(dispatcher.open(0, upload_flags(), &image));
    // Same id 0, different subsystem entirely: still rejected by I2.
    assert!(!dispatcher.open(0, read_flags(), &version_blob));

    assert!(dispatcher.open(1, read_flags(), &version_blob));
}

#[test]
fn open_routes_to_the_subsystem_that_owns_the_blob() {
    let mut dispatcher = dispatcher();
    let image = BlobId::new(crate::constants::IMAGE_BLOB_ID);
    let version_blob = BlobId::new("/version/bmc");

    assert!(dispatcher.open(0, upload_flags(), &image));
    assert!(dispatcher.open(1, read_flags(), &version_blob));
}

#[test]
fn open_on_unknown_blob_fails() {
    let mut dispatcher = dispatcher();
    let bogus = BlobId::new("/nowhere");
    assert!(!dispatcher.open(0, upload_flags(), &bogus));
}

#[test]
fn write_is_denied_on_version_sessions() {
    let mut dispatcher = dispatcher();
    let version_blob = BlobId::new("/version/bmc");
    dispatcher.open(0, read_flags(), &version_blob);
    assert!(!dispatcher.write(0, 0, b"no"));
}

#[test]
fn commit_is_denied_outside_a_verify_session() {
    let mut dispatcher = dispatcher();
    let image = BlobId::new(crate::constants::IMAGE_BLOB_ID);
    dispatcher.open(0, upload_flags(), &image);
    assert!(!dispatcher.commit(0, &[]));
}

#[test]
fn end_to_end_upload_verify_complete_through_the_facade() {
    let (firmware, _writer, trigger) = firmware_harness();
    let (version, _states) = version_harness(&["/version/bmc"]);
    let mut dispatcher = BlobDispatcher::new(firmware, version);
    let image = BlobId::new(crate::constants::IMAGE_BLOB_ID);
    let verify = BlobId::new(crate::constants::VERIFY_BLOB_ID);

    assert!(dispatcher.open(0, upload_flags(), &image));
    assert!(dispatcher.write(0, 0, b"firmware-bytes"));
    assert!(dispatcher.close(0));

    assert!(dispatcher.blob_ids().contains(&verify));

    let verify_flags = OpenFlags::from_bits(FLAG_WRITE | TRANSPORT_BT);
    assert!(dispatcher.open(1, verify_flags, &verify));
    assert!(dispatcher.commit(1, &[]));

    trigger.borrow_mut().status = bmc_flash_types::VerifyStatus::Success;
    let meta = dispatcher.stat_session(1).unwrap();
    assert_eq!(meta.metadata, vec![bmc_flash_types::VerifyStatus::Success.as_byte()]);
}

#[test]
fn read_write_and_close_on_unknown_session_are_no_ops() {
    let mut dispatcher = dispatcher();
    assert!(dispatcher.read(42, 0, 16).is_empty());
    assert!(!dispatcher.write(42, 0, b"x"));
    assert!(!dispatcher.write_meta(42, 0, b"x"));
    assert!(!dispatcher.close(42));
    assert!(!dispatcher.expire(42));
    assert!(dispatcher.stat_session(42).is_none());
}

#[test]
fn delete_routes_to_firmware_subsystem() {
    let mut dispatcher = dispatcher();
    let image = BlobId::new(crate::constants::IMAGE_BLOB_ID);
    let verify = BlobId::new(crate::constants::VERIFY_BLOB_ID);

    dispatcher.open(0, upload_flags(), &image);
    dispatcher.close(0);
    assert!(dispatcher.delete(&verify));
}

#[test]
fn can_handle_blob_covers_both_subsystems() {
    let dispatcher = dispatcher();
    assert!(dispatcher.can_handle_blob(&BlobId::new(crate::constants::IMAGE_BLOB_ID)));
    assert!(dispatcher.can_handle_blob(&BlobId::new("/version/bmc")));
    assert!(!dispatcher.can_handle_blob(&BlobId::new("/nowhere")));
}
