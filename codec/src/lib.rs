//! Typed packets and version-aware dispatch for the Artemis protocol.
//!
//! This crate ties together `wire` framing and the `world` object model:
//! a [`Registry`] maps packet types (and subtypes, and server version
//! ranges) to decoders, a [`Dispatcher`] turns frames into [`Packet`]s,
//! and a [`Session`] merges object updates into a [`world::WorldTable`].
//!
//! # Features
//!
//! - Closed [`Packet`] enum covering the core catalogue
//! - Subtype-refined and version-gated bindings
//! - Opaque passthrough for packets nobody claimed
//! - Legacy and modern object update layouts
//!
//! # Design Principles
//!
//! - **Never guess** - A version-gated packet seen before the version is
//!   known is an error, not a best-effort decode.
//! - **Classified failures** - Every decode error names the packet type,
//!   subtype, offset and reason.
//! - **Lossless passthrough** - Unknown packets re-encode byte for byte.
//! - **Explicit registries** - Bindings are built once and shared by `Arc`;
//!   there is no global table.

mod client;
mod dispatcher;
mod error;
mod limits;
mod object;
mod packet;
mod protocol;
mod registry;
mod server;
mod session;

pub use client::{BeamFrequency, EngSetCoolantPacket, ShipAction, ShipSystem};
pub use dispatcher::Dispatcher;
pub use error::{CodecError, CodecResult, MalformedReason, RegistryError, RegistryResult};
pub use limits::CodecLimits;
pub use object::{read_object, write_object, ObjectLayout, ObjectUpdatePacket};
pub use packet::{Dispatched, Packet, UnknownPacket};
pub use protocol::{CoreProtocol, Protocol};
pub use registry::{Binding, DecodeFn, Registry, Resolution, VersionRange};
pub use server::{
    AudioMode, DestroyObjectPacket, GameStartPacket, IncomingAudioPacket, JumpPhase,
    JumpStatusPacket, VersionPacket, GAME_MESSAGE_TYPE,
};
pub use session::Session;
pub use wire::Limits as WireLimits;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = WireLimits::default();
        let _ = CodecLimits::default();
        let _ = VersionRange::any();
        let _ = Registry::new();
        let _: CodecResult<()> = Ok(());
        let _: RegistryResult<()> = Ok(());
    }

    #[test]
    fn limits_reexported() {
        let limits = WireLimits::default();
        assert!(limits.max_packet_bytes > 0);
    }
}
