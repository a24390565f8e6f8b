//! Decoder bindings.
//!
//! A binding maps `(connection type, packet type)` to a decoder, optionally
//! refined by the payload's leading subtype byte and gated to a half-open
//! range of server versions. Bindings are collected once, before any
//! dispatcher is built, and are read-only afterwards.

use std::collections::HashMap;
use std::fmt;

use wire::{ConnectionType, PacketReader, Version};

use crate::error::{MalformedReason, RegistryError, RegistryResult};
use crate::limits::CodecLimits;
use crate::packet::Packet;
use crate::protocol::Protocol;

/// Decodes one payload into a typed packet.
pub type DecodeFn = fn(&mut PacketReader<'_>, &CodecLimits) -> Result<Packet, MalformedReason>;

/// A half-open range of versions, `[min, max)`. Missing ends are unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionRange {
    min: Option<Version>,
    max: Option<Version>,
}

impl VersionRange {
    /// Every version, including an unknown one.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// `min` and later.
    #[must_use]
    pub const fn at_least(min: Version) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Everything before `max`.
    #[must_use]
    pub const fn below(max: Version) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    #[must_use]
    pub const fn between(min: Version, max: Version) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Returns `true` if the range does not depend on the version.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        self.min.as_ref().map_or(true, |min| version >= min)
            && self.max.as_ref().map_or(true, |max| version < max)
    }

    /// Returns `true` if some version falls in both ranges.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && !ends_before(self.max.as_ref(), other.min.as_ref())
            && !ends_before(other.max.as_ref(), self.min.as_ref())
    }

    fn is_empty(&self) -> bool {
        ends_before(self.max.as_ref(), self.min.as_ref())
    }
}

fn ends_before(max: Option<&Version>, min: Option<&Version>) -> bool {
    matches!((max, min), (Some(max), Some(min)) if max <= min)
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.min, &self.max) {
            (None, None) => f.write_str("any"),
            (Some(min), None) => write!(f, ">= {min}"),
            (None, Some(max)) => write!(f, "< {max}"),
            (Some(min), Some(max)) => write!(f, "[{min}, {max})"),
        }
    }
}

/// One decoder registration.
#[derive(Clone)]
pub struct Binding {
    pub(crate) connection_type: ConnectionType,
    pub(crate) packet_type: u32,
    pub(crate) subtype: Option<u8>,
    pub(crate) versions: VersionRange,
    pub(crate) name: &'static str,
    pub(crate) decode: DecodeFn,
}

impl Binding {
    /// Binds `decode` to every payload of the given type.
    #[must_use]
    pub const fn new(
        connection_type: ConnectionType,
        packet_type: u32,
        name: &'static str,
        decode: DecodeFn,
    ) -> Self {
        Self {
            connection_type,
            packet_type,
            subtype: None,
            versions: VersionRange::any(),
            name,
            decode,
        }
    }

    /// Restricts the binding to payloads whose first byte is `subtype`.
    #[must_use]
    pub fn subtype(mut self, subtype: u8) -> Self {
        self.subtype = Some(subtype);
        self
    }

    /// Restricts the binding to a range of server versions.
    #[must_use]
    pub fn versions(mut self, versions: VersionRange) -> Self {
        self.versions = versions;
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn subtype_value(&self) -> Option<u8> {
        self.subtype
    }

    #[must_use]
    pub const fn version_range(&self) -> &VersionRange {
        &self.versions
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("connection_type", &self.connection_type)
            .field("packet_type", &format_args!("{:#010x}", self.packet_type))
            .field("subtype", &self.subtype)
            .field("versions", &self.versions)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What the registry found for one payload.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'r> {
    Bound(&'r Binding),
    /// Candidates exist but all are gated and the version is unknown.
    NeedsVersion,
    Unbound,
}

/// All decoder bindings, keyed by direction and packet type.
#[derive(Debug, Default)]
pub struct Registry {
    bindings: HashMap<(ConnectionType, u32), Vec<Binding>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding everything `protocol` registers.
    pub fn with_protocol(protocol: &dyn Protocol) -> RegistryResult<Self> {
        let mut registry = Self::new();
        protocol.register(&mut registry)?;
        Ok(registry)
    }

    /// Adds a binding.
    ///
    /// Fails if a binding for the same packet and subtype already covers any
    /// version the new one covers.
    pub fn register(&mut self, binding: Binding) -> RegistryResult<()> {
        let slot = self
            .bindings
            .entry((binding.connection_type, binding.packet_type))
            .or_default();
        if let Some(existing) = slot
            .iter()
            .find(|b| b.subtype == binding.subtype && b.versions.overlaps(&binding.versions))
        {
            return Err(RegistryError::Duplicate {
                connection_type: binding.connection_type,
                packet_type: binding.packet_type,
                subtype: binding.subtype,
                existing: existing.name,
                incoming: binding.name,
            });
        }
        tracing::trace!(
            name = binding.name,
            packet_type = format_args!("{:#010x}", binding.packet_type),
            subtype = ?binding.subtype,
            versions = %binding.versions,
            "registered binding"
        );
        slot.push(binding);
        Ok(())
    }

    /// Picks the binding for a payload.
    ///
    /// Subtype bindings win over type bindings. Within each tier, a binding
    /// applies when its range contains `version`; with no version known only
    /// ungated bindings apply, and a tier made only of gated bindings
    /// reports [`Resolution::NeedsVersion`] instead of falling through.
    #[must_use]
    pub fn resolve(
        &self,
        connection_type: ConnectionType,
        packet_type: u32,
        subtype: Option<u8>,
        version: Option<&Version>,
    ) -> Resolution<'_> {
        let Some(bindings) = self.bindings.get(&(connection_type, packet_type)) else {
            return Resolution::Unbound;
        };

        let tiers = [subtype.map(Some), Some(None)];
        for tier in tiers.into_iter().flatten() {
            let mut candidates = bindings.iter().filter(|b| b.subtype == tier).peekable();
            if candidates.peek().is_none() {
                continue;
            }
            let mut gated = false;
            for binding in candidates {
                match version {
                    Some(version) if binding.versions.contains(version) => {
                        return Resolution::Bound(binding);
                    }
                    None if binding.versions.is_any() => return Resolution::Bound(binding),
                    None => gated = true,
                    Some(_) => {}
                }
            }
            if gated {
                return Resolution::NeedsVersion;
            }
        }
        Resolution::Unbound
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Every binding, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values().flatten()
    }
}
