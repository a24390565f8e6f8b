//! Protocols: named sets of bindings.

use wire::{ConnectionType, Version};

use crate::client::{self, EngSetCoolantPacket, ShipAction};
use crate::error::RegistryResult;
use crate::object::{self, ObjectUpdatePacket};
use crate::registry::{Binding, DecodeFn, Registry, VersionRange};
use crate::server::{
    self, DestroyObjectPacket, GameStartPacket, IncomingAudioPacket, JumpPhase, JumpStatusPacket,
    VersionPacket,
};

/// Something that can add its decoders to a [`Registry`].
///
/// Extensions implement this next to [`CoreProtocol`] and register into the
/// same registry; overlapping bindings are rejected there.
pub trait Protocol {
    fn register(&self, registry: &mut Registry) -> RegistryResult<()>;
}

/// Every packet in this crate's catalogue.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreProtocol;

impl Protocol for CoreProtocol {
    fn register(&self, registry: &mut Registry) -> RegistryResult<()> {
        use ConnectionType::{Client, Server};

        let modern = Version::modern_threshold();

        registry.register(Binding::new(
            Server,
            VersionPacket::PACKET_TYPE,
            "version",
            server::decode_version,
        ))?;
        registry.register(
            Binding::new(
                Server,
                GameStartPacket::PACKET_TYPE,
                "game_start",
                server::decode_game_start,
            )
            .subtype(GameStartPacket::SUBTYPE),
        )?;
        for phase in [JumpPhase::Begin, JumpPhase::End] {
            registry.register(
                Binding::new(
                    Server,
                    JumpStatusPacket::PACKET_TYPE,
                    "jump_status",
                    server::decode_jump_status,
                )
                .subtype(phase.subtype()),
            )?;
        }
        registry.register(Binding::new(
            Server,
            IncomingAudioPacket::PACKET_TYPE,
            "incoming_audio",
            server::decode_incoming_audio,
        ))?;
        registry.register(
            Binding::new(
                Server,
                ObjectUpdatePacket::PACKET_TYPE,
                "object_update_legacy",
                object::decode_legacy_update,
            )
            .versions(VersionRange::below(modern.clone())),
        )?;
        registry.register(
            Binding::new(
                Server,
                ObjectUpdatePacket::PACKET_TYPE,
                "object_update",
                object::decode_modern_update,
            )
            .versions(VersionRange::at_least(modern)),
        )?;
        registry.register(Binding::new(
            Server,
            DestroyObjectPacket::PACKET_TYPE,
            "destroy_object",
            server::decode_destroy_object,
        ))?;

        let actions: [(u8, &'static str, DecodeFn); 3] = [
            (ShipAction::SET_BEAM_FREQ, "set_beam_freq", client::decode_set_beam_freq),
            (ShipAction::REQUEST_DOCK, "request_dock", client::decode_request_dock),
            (ShipAction::READY, "ready", client::decode_ready),
        ];
        for (subtype, name, decode) in actions {
            registry.register(
                Binding::new(Client, ShipAction::PACKET_TYPE, name, decode).subtype(subtype),
            )?;
        }
        registry.register(Binding::new(
            Client,
            ShipAction::PACKET_TYPE,
            "ship_action",
            client::decode_ship_action,
        ))?;
        registry.register(Binding::new(
            Client,
            EngSetCoolantPacket::PACKET_TYPE,
            "eng_set_coolant",
            client::decode_eng_set_coolant,
        ))?;

        tracing::debug!(bindings = registry.len(), "registered core protocol");
        Ok(())
    }
}
