use std::sync::Arc;

use codec::{
    AudioMode, BeamFrequency, Binding, CodecError, CoreProtocol, Dispatched, Dispatcher,
    EngSetCoolantPacket, GameStartPacket, IncomingAudioPacket, JumpPhase, JumpStatusPacket,
    MalformedReason, ObjectLayout, ObjectUpdatePacket, Packet, Protocol, Registry, RegistryError,
    RegistryResult, ShipAction, ShipSystem, VersionPacket, VersionRange,
};
use wire::{encode_frame, ConnectionType, DecodeError, PacketReader, Version};
use world::{Mine, ObjectId};

fn core() -> Arc<Registry> {
    Arc::new(Registry::with_protocol(&CoreProtocol).unwrap())
}

fn version_frame(version: Version) -> Vec<u8> {
    Packet::from(VersionPacket::new(version)).encode().unwrap()
}

fn roundtrip(packet: Packet) -> Packet {
    let bytes = packet.encode().unwrap();
    match Dispatcher::new(core()).dispatch_bytes(&bytes).unwrap() {
        Dispatched::Packet(decoded) => decoded,
        Dispatched::Unknown(unknown) => panic!("unexpected passthrough: {unknown:?}"),
    }
}

#[test]
fn ungated_packets_roundtrip() {
    let packets: Vec<Packet> = vec![
        GameStartPacket { unknown: 3 }.into(),
        JumpStatusPacket {
            phase: JumpPhase::Begin,
        }
        .into(),
        JumpStatusPacket {
            phase: JumpPhase::End,
        }
        .into(),
        IncomingAudioPacket {
            id: 12,
            mode: AudioMode::Incoming {
                title: "Distress call".into(),
                file: "msg12.ogg".into(),
            },
        }
        .into(),
        IncomingAudioPacket {
            id: 12,
            mode: AudioMode::Playing,
        }
        .into(),
        ShipAction::SetBeamFreq(BeamFrequency::E).into(),
        ShipAction::RequestDock.into(),
        ShipAction::Ready.into(),
        ShipAction::Other {
            subtype: 0x1a,
            arg: 0,
        }
        .into(),
        EngSetCoolantPacket {
            system: ShipSystem::WarpJump,
            value: 4,
        }
        .into(),
    ];
    for packet in packets {
        assert_eq!(roundtrip(packet.clone()), packet);
    }
}

#[test]
fn ship_action_subtypes_fall_back_to_generic() {
    let mut dispatcher = Dispatcher::new(core());
    // wide subtypes whose low byte matches a dedicated binding still fall back
    for subtype in [0x00, 0x0a, 0x10, 0x1a, 0x10b, 0x0f00_0007, -1] {
        let bytes = Packet::from(ShipAction::Other { subtype, arg: 9 })
            .encode()
            .unwrap();
        let decoded = dispatcher.dispatch_bytes(&bytes).unwrap();
        assert_eq!(
            decoded.packet(),
            Some(&Packet::ShipAction(ShipAction::Other { subtype, arg: 9 }))
        );
    }
}

#[test]
fn shared_type_split_by_subtype() {
    let mut dispatcher = Dispatcher::new(core());
    let start = encode_frame(
        ConnectionType::Server,
        GameStartPacket::PACKET_TYPE,
        &[8, 0, 0, 0, 1, 0, 0, 0],
    )
    .unwrap();
    let jump = encode_frame(
        ConnectionType::Server,
        JumpStatusPacket::PACKET_TYPE,
        &[0x0d, 0, 0, 0],
    )
    .unwrap();
    assert!(matches!(
        dispatcher.dispatch_bytes(&start).unwrap().packet(),
        Some(Packet::GameStart(GameStartPacket { unknown: 1 }))
    ));
    assert!(matches!(
        dispatcher.dispatch_bytes(&jump).unwrap().packet(),
        Some(Packet::JumpStatus(JumpStatusPacket {
            phase: JumpPhase::End
        }))
    ));

    // an unclaimed subtype of a type with only subtype bindings passes through
    let other = encode_frame(
        ConnectionType::Server,
        GameStartPacket::PACKET_TYPE,
        &[0x42, 0, 0, 0],
    )
    .unwrap();
    assert!(matches!(
        dispatcher.dispatch_bytes(&other).unwrap(),
        Dispatched::Unknown(_)
    ));
}

#[test]
fn layout_switches_with_version() {
    let ship_bytes = |layout| {
        Packet::from(
            ObjectUpdatePacket::new(layout).with(Mine {
                x: Some(1.0),
                ..Mine::new(ObjectId(3))
            }),
        )
        .encode()
        .unwrap()
    };

    let mut dispatcher = Dispatcher::new(core());
    dispatcher
        .dispatch_bytes(&version_frame(Version::new([2, 0])))
        .unwrap();
    let Some(Packet::ObjectUpdate(update)) = dispatcher
        .dispatch_bytes(&ship_bytes(ObjectLayout::Legacy))
        .unwrap()
        .packet()
        .cloned()
    else {
        panic!("expected object update");
    };
    assert_eq!(update.layout, ObjectLayout::Legacy);
    assert_eq!(dispatcher.version(), Some(&Version::new([2, 0])));

    dispatcher
        .dispatch_bytes(&version_frame(Version::new([2, 4, 0])))
        .unwrap();
    let Some(Packet::ObjectUpdate(update)) = dispatcher
        .dispatch_bytes(&ship_bytes(ObjectLayout::Modern))
        .unwrap()
        .packet()
        .cloned()
    else {
        panic!("expected object update");
    };
    assert_eq!(update.layout, ObjectLayout::Modern);
}

#[test]
fn gated_packet_before_version_is_an_error() {
    let mut dispatcher = Dispatcher::new(core());
    let bytes = Packet::from(ObjectUpdatePacket::new(ObjectLayout::Modern))
        .encode()
        .unwrap();
    let err = dispatcher.dispatch_bytes(&bytes).unwrap_err();
    assert!(matches!(
        err,
        CodecError::VersionUnknown {
            packet_type: ObjectUpdatePacket::PACKET_TYPE,
            ..
        }
    ));
    assert!(err.is_recoverable());
}

#[test]
fn unknown_packet_reencodes_identically() {
    let mut dispatcher = Dispatcher::new(core());
    let bytes = encode_frame(ConnectionType::Client, 0x1234_abcd, b"opaque payload").unwrap();
    let dispatched = dispatcher.dispatch_bytes(&bytes).unwrap();
    assert!(matches!(dispatched, Dispatched::Unknown(_)));
    assert_eq!(dispatched.encode().unwrap(), bytes);
}

#[test]
fn truncated_payload_is_classified() {
    let mut dispatcher = Dispatcher::new(core());
    let bytes = encode_frame(
        ConnectionType::Client,
        EngSetCoolantPacket::PACKET_TYPE,
        &[0, 0, 0, 0, 2, 0, 0, 0],
    )
    .unwrap();
    match dispatcher.dispatch_bytes(&bytes).unwrap_err() {
        CodecError::Malformed {
            connection_type,
            packet_type,
            subtype,
            offset,
            reason,
        } => {
            assert_eq!(connection_type, ConnectionType::Client);
            assert_eq!(packet_type, EngSetCoolantPacket::PACKET_TYPE);
            assert_eq!(subtype, None);
            assert_eq!(offset, 8);
            assert!(matches!(
                reason,
                MalformedReason::Wire(DecodeError::UnexpectedEof { .. })
            ));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn out_of_range_enum_is_classified() {
    let mut dispatcher = Dispatcher::new(core());
    let mut payload = 0x0b_i32.to_le_bytes().to_vec();
    payload.extend_from_slice(&5_i32.to_le_bytes());
    let bytes = encode_frame(ConnectionType::Client, ShipAction::PACKET_TYPE, &payload).unwrap();
    let err = dispatcher.dispatch_bytes(&bytes).unwrap_err();
    assert!(matches!(
        err,
        CodecError::Malformed {
            subtype: Some(0x0b),
            reason: MalformedReason::InvalidEnum {
                field: "beam frequency",
                value: 5
            },
            ..
        }
    ));
}

#[test]
fn failed_decode_keeps_dispatcher_usable() {
    let mut dispatcher = Dispatcher::new(core());
    let bad = encode_frame(
        ConnectionType::Server,
        IncomingAudioPacket::PACKET_TYPE,
        &[1, 0, 0, 0, 9, 0, 0, 0],
    )
    .unwrap();
    assert!(dispatcher.dispatch_bytes(&bad).is_err());
    let good = Packet::from(GameStartPacket::default()).encode().unwrap();
    assert!(dispatcher.dispatch_bytes(&good).is_ok());
}

struct BeamOverride;

fn decode_beam_override(
    reader: &mut PacketReader<'_>,
    _: &codec::CodecLimits,
) -> Result<Packet, MalformedReason> {
    let subtype = reader.read_i32()?;
    let arg = reader.read_i32()?;
    Ok(Packet::ShipAction(ShipAction::Other { subtype, arg }))
}

impl Protocol for BeamOverride {
    fn register(&self, registry: &mut Registry) -> RegistryResult<()> {
        registry.register(
            Binding::new(
                ConnectionType::Client,
                ShipAction::PACKET_TYPE,
                "beam_override",
                decode_beam_override,
            )
            .subtype(ShipAction::SET_BEAM_FREQ),
        )
    }
}

#[test]
fn extension_cannot_shadow_core_binding() {
    let mut registry = Registry::with_protocol(&CoreProtocol).unwrap();
    let err = BeamOverride.register(&mut registry).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Duplicate {
            existing: "set_beam_freq",
            incoming: "beam_override",
            ..
        }
    ));
}

#[test]
fn extension_gated_to_future_versions() {
    struct Future;
    impl Protocol for Future {
        fn register(&self, registry: &mut Registry) -> RegistryResult<()> {
            registry.register(
                Binding::new(
                    ConnectionType::Client,
                    ShipAction::PACKET_TYPE,
                    "future_action",
                    decode_beam_override,
                )
                .subtype(0x30)
                .versions(VersionRange::at_least(Version::new([2, 7]))),
            )
        }
    }

    let mut registry = Registry::with_protocol(&CoreProtocol).unwrap();
    Future.register(&mut registry).unwrap();
    let mut dispatcher = Dispatcher::new(Arc::new(registry));

    let bytes = Packet::from(ShipAction::Other {
        subtype: 0x30,
        arg: 1,
    })
    .encode()
    .unwrap();

    // subtype binding is gated and the version unknown
    assert!(matches!(
        dispatcher.dispatch_bytes(&bytes),
        Err(CodecError::VersionUnknown {
            subtype: Some(0x30),
            ..
        })
    ));

    // an older server falls back to the generic binding
    dispatcher.set_version(Version::new([2, 3]));
    assert!(dispatcher.dispatch_bytes(&bytes).is_ok());
}
