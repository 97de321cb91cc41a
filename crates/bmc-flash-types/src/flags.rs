/// Low bit: the session may be read from.
pub const FLAG_READ: u16 = 1 << 0;
/// Second bit: the session may be written to.
pub const FLAG_WRITE: u16 = 1 << 1;

/// Block-transfer transport bit.
pub const TRANSPORT_BT: u16 = 1 << 8;
/// P2A bridge transport bit.
pub const TRANSPORT_P2A: u16 = 1 << 9;
/// LPC window transport bit.
pub const TRANSPORT_LPC: u16 = 1 << 10;

/// Union of every transport bit this crate knows about. A deployment's
/// configured transport mask is always a subset of this.
pub const TRANSPORT_MASK: u16 = TRANSPORT_BT | TRANSPORT_P2A | TRANSPORT_LPC;

const KNOWN_BITS: u16 = FLAG_READ | FLAG_WRITE | TRANSPORT_MASK;

/// The flags word passed to `open`.
///
/// Bits 0-1 are the read/write request, bits 8-10 select exactly one
/// transport. Any other bit set makes the flags word invalid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct OpenFlags(pub u16);

impl OpenFlags {
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn can_read(self) -> bool {
        self.0 & FLAG_READ != 0
    }

    pub const fn can_write(self) -> bool {
        self.0 & FLAG_WRITE != 0
    }

    /// The transport bits set on these flags (zero, one, or more than one).
    pub const fn transport_bits(self) -> u16 {
        self.0 & TRANSPORT_MASK
    }

    /// True iff exactly one transport bit is set.
    pub const fn has_single_transport(self) -> bool {
        self.transport_bits().count_ones() == 1
    }

    /// True iff bits outside read/write/transport are set.
    pub const fn has_unknown_bits(self) -> bool {
        self.0 & !KNOWN_BITS != 0
    }
}
