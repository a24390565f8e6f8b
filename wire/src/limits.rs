//! Configurable limits for bounded decoding.

/// Wire-level limits for frame and payload decoding.
///
/// Enforced by the frame buffer (whole frames) and the payload reader
/// (string lengths) so a hostile length prefix cannot force a large
/// allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Maximum frame size in bytes, preamble included.
    pub max_packet_bytes: usize,

    /// Maximum string length in UTF-16 units, terminator excluded.
    pub max_string_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Full world updates on a busy map stay well below this
            max_packet_bytes: 1024 * 1024,
            max_string_chars: 4096,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_packet_bytes: 4096,
            max_string_chars: 64,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_packet_bytes: usize::MAX,
            max_string_chars: usize::MAX,
        }
    }
}
