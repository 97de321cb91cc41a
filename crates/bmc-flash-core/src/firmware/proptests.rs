//! Property-based checks for the firmware FSM: `blob_ids()` purity and the
//! open;close round-trip into `verificationPending` regardless of what was
//! written in between.

use bmc_flash_types::{OpenFlags, FLAG_WRITE, TRANSPORT_BT};
use proptest::prelude::*;

use super::UpdateState;
use crate::session_table::SessionTable;
use crate::testing::firmware_harness;

proptest! {
    #[test]
    fn blob_ids_is_a_pure_function_of_state(writes in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..8)) {
        let (mut handler, _writer, _trigger) = firmware_harness();
        let mut sessions = SessionTable::new();
        let image = bmc_flash_types::BlobId::new(crate::constants::IMAGE_BLOB_ID);
        let flags = OpenFlags::from_bits(FLAG_WRITE | TRANSPORT_BT);

        handler.open(&mut sessions, 0, flags, &image).unwrap();
        for (offset, chunk) in writes.iter().enumerate() {
            handler.write(&sessions, 0, offset as u32, chunk);
        }

        let first = handler.blob_ids();
        let second = handler.blob_ids();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn open_close_upload_target_always_lands_in_verification_pending(writes in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..8)) {
        let (mut handler, _writer, _trigger) = firmware_harness();
        let mut sessions = SessionTable::new();
        let image = bmc_flash_types::BlobId::new(crate::constants::IMAGE_BLOB_ID);
        let flags = OpenFlags::from_bits(FLAG_WRITE | TRANSPORT_BT);

        prop_assert!(handler.open(&mut sessions, 0, flags, &image).is_ok());
        for (offset, chunk) in writes.iter().enumerate() {
            handler.write(&sessions, 0, offset as u32, chunk);
        }
        prop_assert!(handler.close(&mut sessions, 0));
        prop_assert_eq!(handler.state(), UpdateState::VerificationPending);
    }
}
