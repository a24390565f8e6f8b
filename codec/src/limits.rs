//! Limits for codec-level decoding.

/// Codec-specific limits enforced while decoding packet bodies.
///
/// Byte and string limits live in [`wire::Limits`]; these bound what a
/// single well-framed payload may ask the decoder to build.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecLimits {
    /// Maximum number of records in one object update packet.
    pub max_objects_per_update: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_objects_per_update: 4096,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_objects_per_update: 16,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_objects_per_update: usize::MAX,
        }
    }
}
