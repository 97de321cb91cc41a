/// Polled state of an in-flight firmware verification.
///
/// `Other` is the sentinel reported before verification has ever been
/// triggered; it is distinct from `Running` so a caller can tell "nothing is
/// happening yet" from "something is happening".
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VerifyStatus {
    Running,
    Success,
    Failed,
    Other,
}

impl VerifyStatus {
    /// Wire encoding used when packing this into `BlobMeta::metadata`.
    pub const fn as_byte(self) -> u8 {
        match self {
            VerifyStatus::Running => 0,
            VerifyStatus::Success => 1,
            VerifyStatus::Failed => 2,
            VerifyStatus::Other => 3,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, VerifyStatus::Success | VerifyStatus::Failed)
    }
}

/// Polled state of an in-flight version probe.
///
/// Structurally the same shape as [`VerifyStatus`] but kept as a separate
/// type: the version subsystem and the firmware subsystem evolve
/// independently and conflating them would couple two unrelated state
/// machines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ActionStatus {
    Unknown,
    Running,
    Success,
    Failed,
}

impl ActionStatus {
    pub const fn as_byte(self) -> u8 {
        match self {
            ActionStatus::Unknown => 0,
            ActionStatus::Running => 1,
            ActionStatus::Success => 2,
            ActionStatus::Failed => 3,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ActionStatus::Success | ActionStatus::Failed)
    }
}
