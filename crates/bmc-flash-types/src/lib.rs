//! Wire-level data model shared by the firmware and version blob handlers.
//!
//! Nothing in this crate knows about state machines or admissibility rules —
//! it only defines the shapes that cross the handler facade: blob names,
//! open flags, session records, stat payloads, and the small status enums
//! that get polled through `stat`.

mod blob_id;
mod flags;
mod meta;
mod session;
mod status;

pub use blob_id::BlobId;
pub use flags::{
    FLAG_READ, FLAG_WRITE, OpenFlags, TRANSPORT_BT, TRANSPORT_LPC, TRANSPORT_MASK, TRANSPORT_P2A,
};
pub use meta::BlobMeta;
pub use session::{Session, SessionRole};
pub use status::{ActionStatus, VerifyStatus};
