//! Property-based checks for I1 (one session per blob) and I2 (globally
//! unique session ids) under arbitrary interleavings of open/close, mirroring
//! a tiny reference model against the real dispatcher.

use std::collections::HashMap;

use bmc_flash_types::{BlobId, OpenFlags, FLAG_READ};
use proptest::prelude::*;

use super::BlobDispatcher;
use crate::testing::{firmware_harness, version_harness};

const BLOBS: [&str; 2] = ["/version/a", "/version/b"];

#[derive(Clone, Copy, Debug)]
enum Op {
    Open { id: u16, blob: u8 },
    Close { id: u16 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u16..4, 0u8..2).prop_map(|(id, blob)| Op::Open { id, blob }),
        (0u16..4).prop_map(|id| Op::Close { id }),
    ]
}

proptest! {
    #[test]
    fn i1_and_i2_hold_under_random_open_close_sequences(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let (firmware, _writer, _trigger) = firmware_harness();
        let (version, _states) = version_harness(&BLOBS);
        let mut dispatcher = BlobDispatcher::new(firmware, version);

        // Reference model: live session id -> blob index it owns.
        let mut model: HashMap<u16, u8> = HashMap::new();

        for op in ops {
            match op {
                Op::Open { id, blob } => {
                    let expected = !model.contains_key(&id)
                        && !model.values().any(|&b| b == blob);
                    let blob_id = BlobId::new(BLOBS[blob as usize]);
                    let actual = dispatcher.open(id, OpenFlags::from_bits(FLAG_READ), &blob_id);
                    prop_assert_eq!(actual, expected, "open({}, blob {}) diverged from model", id, blob);
                    if actual {
                        model.insert(id, blob);
                    }
                }
                Op::Close { id } => {
                    let expected = model.contains_key(&id);
                    let actual = dispatcher.close(id);
                    prop_assert_eq!(actual, expected, "close({}) diverged from model", id);
                    if actual {
                        model.remove(&id);
                    }
                }
            }

            // I1/I2 as a direct structural check: every live model entry
            // must still be independently open-able-as-rejected (blob busy)
            // and id-busy from the dispatcher's point of view.
            for (&id, &blob) in &model {
                let other_id = (0..4u16).find(|i| *i != id && !model.contains_key(i));
                if let Some(other_id) = other_id {
                    let blob_id = BlobId::new(BLOBS[blob as usize]);
                    let rejected = !dispatcher.open(other_id, OpenFlags::from_bits(FLAG_READ), &blob_id);
                    prop_assert!(rejected, "blob {} open twice while session {} already holds it", blob, id);
                }
            }
        }
    }
}
