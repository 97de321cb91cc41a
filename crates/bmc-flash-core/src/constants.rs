//! Canonical blob ids for the firmware subsystem. These are the strings a
//! real deployment registers with [`crate::firmware::FirmwareConfig`]; tests
//! and examples reuse them so fixtures read the same way a real config
//! would.

pub const IMAGE_BLOB_ID: &str = "/flash/image";
pub const TARBALL_BLOB_ID: &str = "/flash/tarball";
pub const HASH_BLOB_ID: &str = "/flash/hash";
pub const VERIFY_BLOB_ID: &str = "/flash/verify";
pub const ACTIVE_IMAGE_BLOB_ID: &str = "/flash/active/image";
pub const ACTIVE_HASH_BLOB_ID: &str = "/flash/active/hash";

/// Bytes read in one shot once a version probe reports success. Version
/// strings are small (build ids, semantic versions); there is no interface
/// for querying payload length up front, so the whole payload is
/// materialized the first time it's needed and then served out of memory.
pub const VERSION_PAYLOAD_READ_CAP: u32 = 4096;
