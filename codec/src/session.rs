//! A connection's decoding state: framing, dispatch and the world table.

use std::sync::Arc;

use wire::{Frame, FrameBuffer, Limits, Version};
use world::WorldTable;

use crate::dispatcher::Dispatcher;
use crate::error::CodecResult;
use crate::limits::CodecLimits;
use crate::packet::{Dispatched, Packet};
use crate::registry::Registry;

/// Decodes one connection's traffic and merges object updates into a
/// shared [`WorldTable`].
///
/// A packet that fails to decode contributes nothing to the table. The table
/// may be shared with readers on other threads.
#[derive(Debug)]
pub struct Session {
    dispatcher: Dispatcher,
    frames: FrameBuffer,
    world: Arc<WorldTable>,
}

impl Session {
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_world(registry, Arc::new(WorldTable::new()))
    }

    /// A session merging into an existing table.
    #[must_use]
    pub fn with_world(registry: Arc<Registry>, world: Arc<WorldTable>) -> Self {
        Self::with_limits(registry, world, Limits::default(), CodecLimits::default())
    }

    #[must_use]
    pub fn with_limits(
        registry: Arc<Registry>,
        world: Arc<WorldTable>,
        wire_limits: Limits,
        limits: CodecLimits,
    ) -> Self {
        Self {
            frames: FrameBuffer::new(wire_limits.clone()),
            dispatcher: Dispatcher::with_limits(registry, wire_limits, limits),
            world,
        }
    }

    #[must_use]
    pub fn world(&self) -> &Arc<WorldTable> {
        &self.world
    }

    #[must_use]
    pub fn version(&self) -> Option<&Version> {
        self.dispatcher.version()
    }

    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Dispatches one frame and applies what it says to the world.
    pub fn handle_frame(&mut self, frame: &Frame) -> CodecResult<Dispatched> {
        let dispatched = self.dispatcher.dispatch(frame)?;
        match dispatched.packet() {
            Some(Packet::ObjectUpdate(update)) => {
                for object in &update.objects {
                    self.world.apply(object.clone())?;
                }
                tracing::trace!(count = update.objects.len(), "merged object update");
            }
            Some(Packet::DestroyObject(destroyed)) => {
                tracing::debug!(
                    kind = %destroyed.kind,
                    id = destroyed.id.0,
                    "object destroyed; world table keeps it"
                );
            }
            _ => {}
        }
        Ok(dispatched)
    }

    /// Feeds stream bytes and handles every frame they complete.
    ///
    /// Each frame gets its own result so one bad payload does not hide the
    /// rest. A framing error resets the stream buffer and is reported as the
    /// last element, after the frames completed ahead of it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<CodecResult<Dispatched>> {
        let pushed = self.frames.push(bytes);
        let mut results: Vec<_> = pushed
            .frames
            .iter()
            .map(|frame| self.handle_frame(frame))
            .collect();
        if let Some(err) = pushed.error {
            results.push(Err(err.into()));
        }
        results
    }

    /// Ends the session: forgets the version, buffered bytes and every
    /// entity.
    pub fn teardown(&mut self) {
        tracing::debug!(entities = self.world.len(), "session teardown");
        self.dispatcher.reset();
        self.frames.clear();
        self.world.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::object::{ObjectLayout, ObjectUpdatePacket};
    use crate::protocol::CoreProtocol;
    use crate::server::VersionPacket;
    use world::{Mine, ObjectId, ObjectKind};

    fn session() -> Session {
        Session::new(Arc::new(Registry::with_protocol(&CoreProtocol).unwrap()))
    }

    fn frame_bytes(packet: impl Into<Packet>) -> Vec<u8> {
        packet.into().encode().unwrap()
    }

    #[test]
    fn object_update_before_version_is_rejected() {
        let mut session = session();
        let update = ObjectUpdatePacket::new(ObjectLayout::Modern).with(Mine::new(ObjectId(1)));
        let results = session.push(&frame_bytes(update));
        assert!(matches!(
            results.as_slice(),
            [Err(CodecError::VersionUnknown { .. })]
        ));
        assert!(session.world().is_empty());
    }

    #[test]
    fn updates_merge_after_version() {
        let mut session = session();
        let mut stream = frame_bytes(VersionPacket::new(Version::new([2, 1, 0])));
        stream.extend(frame_bytes(
            ObjectUpdatePacket::new(ObjectLayout::Modern).with(Mine {
                x: Some(1.0),
                ..Mine::new(ObjectId(4))
            }),
        ));
        stream.extend(frame_bytes(
            ObjectUpdatePacket::new(ObjectLayout::Modern).with(Mine {
                z: Some(3.0),
                ..Mine::new(ObjectId(4))
            }),
        ));

        let results = session.push(&stream);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(Result::is_ok));

        let mine: Mine = session.world().get_as(ObjectId(4)).unwrap();
        assert_eq!(mine.x, Some(1.0));
        assert_eq!(mine.z, Some(3.0));
        assert_eq!(mine.y, None);
    }

    #[test]
    fn teardown_clears_everything() {
        let mut session = session();
        session.push(&frame_bytes(VersionPacket::new(Version::new([2, 1, 0]))));
        session.push(&frame_bytes(
            ObjectUpdatePacket::new(ObjectLayout::Modern).with(Mine::new(ObjectId(1))),
        ));
        assert_eq!(session.world().objects_of(ObjectKind::Mine).len(), 1);

        session.teardown();
        assert!(session.version().is_none());
        assert!(session.world().is_empty());
    }

    #[test]
    fn frames_ahead_of_bad_magic_still_apply() {
        let mut session = session();
        let mut stream = frame_bytes(VersionPacket::new(Version::new([2, 1, 0])));
        stream.extend(frame_bytes(
            ObjectUpdatePacket::new(ObjectLayout::Modern).with(Mine {
                x: Some(1.0),
                ..Mine::new(ObjectId(4))
            }),
        ));
        let mut bad = frame_bytes(VersionPacket::new(Version::new([2, 1, 0])));
        bad[0] = 0x00;
        stream.extend(bad);

        let results = session.push(&stream);
        assert!(matches!(
            results.as_slice(),
            [Ok(_), Ok(_), Err(CodecError::Frame(wire::DecodeError::InvalidMagic { .. }))]
        ));
        assert_eq!(session.version(), Some(&Version::new([2, 1, 0])));
        assert_eq!(session.world().len(), 1);

        let results = session.push(&frame_bytes(
            ObjectUpdatePacket::new(ObjectLayout::Modern).with(Mine::new(ObjectId(5))),
        ));
        assert!(results.iter().all(Result::is_ok));
        assert_eq!(session.world().len(), 2);
    }

    #[test]
    fn bad_magic_reports_frame_error() {
        let mut session = session();
        let results = session.push(&[0u8; 24]);
        assert!(matches!(results.as_slice(), [Err(CodecError::Frame(_))]));
    }
}
