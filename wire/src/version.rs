//! Protocol version numbers.
//!
//! Servers before 2.1 announce their version as a single float; later ones
//! send the float `2.0` followed by three integer parts. Both encodings map
//! onto the same ordered [`Version`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{VersionError, WriterResult};
use crate::writer::PacketWriter;

/// An ordered sequence of version parts.
///
/// Missing trailing parts compare as zero, so `2.1` and `2.1.0` are equal
/// and hash identically.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    parts: Vec<u32>,
}

impl Version {
    /// Creates a version from its parts, most significant first.
    #[must_use]
    pub fn new(parts: impl Into<Vec<u32>>) -> Self {
        Self {
            parts: parts.into(),
        }
    }

    /// The first version that uses the three-part encoding (2.1).
    #[must_use]
    pub fn modern_threshold() -> Self {
        Self::new([2, 1])
    }

    /// Decodes the legacy single-float encoding.
    ///
    /// The hundredths are taken as the minor part and divided by ten when
    /// below 40, matching how servers before 1.41 encoded their minor
    /// version. The arithmetic is done in `f32` like the servers do.
    pub fn from_legacy(value: f32) -> Result<Self, VersionError> {
        if !value.is_finite() || value < 0.0 {
            return Err(VersionError::LegacyNotFinite { value });
        }
        if value >= 2.1 {
            return Err(VersionError::LegacyOutOfRange { value });
        }

        let major = value.floor();
        let mut minor = ((value - major) * 100.0).floor() as u32;
        if minor < 40 {
            minor /= 10;
        }
        Ok(Self::new([major as u32, minor, 0]))
    }

    /// The parts as constructed.
    #[must_use]
    pub fn parts(&self) -> &[u32] {
        &self.parts
    }

    /// Part `index`, zero when absent.
    #[must_use]
    pub fn part(&self, index: usize) -> u32 {
        self.parts.get(index).copied().unwrap_or(0)
    }

    /// Returns `true` for versions before 2.1.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        *self < Self::modern_threshold()
    }

    /// The float announced in the version packet.
    ///
    /// Legacy versions encode `major + minor / 10`; modern ones always send
    /// `2.0` so legacy-only readers still see something sane.
    ///
    /// The legacy encoding is lossy against [`from_legacy`](Self::from_legacy),
    /// which reads hundredths: `[1, 6]` encodes to `1.6` and decodes to
    /// `[1, 60, 0]`. Whole versions such as `[2, 0]` come back unchanged.
    #[must_use]
    pub fn legacy_float(&self) -> f32 {
        if self.is_legacy() {
            self.part(0) as f32 + self.part(1) as f32 * 0.1
        } else {
            2.0
        }
    }

    /// Writes the float followed, for modern versions, by exactly three parts.
    pub fn write_to(&self, writer: &mut PacketWriter) -> WriterResult<()> {
        writer.write_f32(self.legacy_float())?;
        if !self.is_legacy() {
            for index in 0..3 {
                writer.write_u32(self.part(index))?;
            }
        }
        Ok(())
    }

    fn significant(&self) -> &[u32] {
        let len = self
            .parts
            .iter()
            .rposition(|part| *part != 0)
            .map_or(0, |last| last + 1);
        &self.parts[..len]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|index| self.part(index).cmp(&other.part(index)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_legacy() {
            return write!(f, "{}.{}", self.part(0), self.part(1));
        }
        let mut first = true;
        for part in &self.parts {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{ConnectionType, HEADER_SIZE};
    use crate::reader::PacketReader;
    use std::collections::HashSet;

    #[test]
    fn ordering_with_zero_fill() {
        assert!(Version::new([2, 0]) < Version::new([2, 1]));
        assert!(Version::new([2, 1]) < Version::new([2, 1, 1]));
        assert_eq!(Version::new([2, 1]), Version::new([2, 1, 0]));
        assert!(Version::new([1, 9, 9]) < Version::new([2]));
    }

    #[test]
    fn equal_versions_hash_equal() {
        let mut set = HashSet::new();
        set.insert(Version::new([2, 1]));
        assert!(set.contains(&Version::new([2, 1, 0, 0])));
    }

    #[test]
    fn legacy_boundary() {
        assert!(Version::new([2, 0, 9]).is_legacy());
        assert!(!Version::new([2, 1]).is_legacy());
        assert!(!Version::new([2, 3, 0]).is_legacy());
    }

    #[test]
    fn legacy_ctor_rejects_modern_values() {
        assert_eq!(
            Version::from_legacy(2.1),
            Err(VersionError::LegacyOutOfRange { value: 2.1 })
        );
        assert!(Version::from_legacy(3.0).is_err());
        assert!(Version::from_legacy(f32::NAN).is_err());
        assert!(Version::from_legacy(-1.0).is_err());
    }

    #[test]
    fn legacy_two_point_zero_five() {
        // (2.05 - 2) * 100 in f32 is just under 5, so the minor floors to 4 and
        // the below-40 rule reduces it to 0.
        assert_eq!(Version::from_legacy(2.05).unwrap(), Version::new([2, 0, 0]));
    }

    #[test]
    fn legacy_exact_values() {
        assert_eq!(Version::from_legacy(2.0).unwrap(), Version::new([2, 0, 0]));
        assert_eq!(Version::from_legacy(1.5).unwrap(), Version::new([1, 50, 0]));
        assert_eq!(Version::from_legacy(1.25).unwrap(), Version::new([1, 2, 0]));
    }

    #[test]
    fn legacy_encoding_is_lossy() {
        let version = Version::new([1, 6]);
        let float = version.legacy_float();
        assert!((float - 1.6).abs() < 1e-6);
        assert_eq!(Version::from_legacy(float).unwrap(), Version::new([1, 60, 0]));
    }

    #[test]
    fn legacy_whole_versions_survive() {
        for major in [1, 2] {
            let version = Version::new([major, 0]);
            assert_eq!(Version::from_legacy(version.legacy_float()).unwrap(), version);
        }
    }

    #[test]
    fn display_legacy_and_modern() {
        assert_eq!(Version::new([1, 6, 0]).to_string(), "1.6");
        assert_eq!(Version::new([2, 3, 0]).to_string(), "2.3.0");
        assert_eq!(Version::new([2, 1]).to_string(), "2.1");
    }

    #[test]
    fn modern_write_float_then_three_parts() {
        let mut writer = PacketWriter::new();
        writer.start(ConnectionType::Server, 0xe548_e74a);
        Version::new([2, 1]).write_to(&mut writer).unwrap();
        let frame = writer.flush().unwrap();

        let mut reader = PacketReader::new(&frame[HEADER_SIZE..]);
        assert!((reader.read_f32().unwrap() - 2.0).abs() < f32::EPSILON);
        assert_eq!(reader.read_u32().unwrap(), 2);
        assert_eq!(reader.read_u32().unwrap(), 1);
        assert_eq!(reader.read_u32().unwrap(), 0);
        assert!(!reader.has_more());
    }

    #[test]
    fn legacy_write_float_only() {
        let mut writer = PacketWriter::new();
        writer.start(ConnectionType::Server, 0xe548_e74a);
        Version::new([1, 6]).write_to(&mut writer).unwrap();
        let frame = writer.flush().unwrap();

        let mut reader = PacketReader::new(&frame[HEADER_SIZE..]);
        assert!((reader.read_f32().unwrap() - 1.6).abs() < 1e-5);
        assert!(!reader.has_more());
    }
}
