//! Wire framing and payload primitives for the Artemis protocol.
//!
//! This crate handles the binary wire format: the 24-byte frame preamble,
//! stream buffering, little-endian payload reads and writes, and the
//! protocol [`Version`]. It does not know about concrete packets or game
//! objects, only the structure every packet shares.
//!
//! # Design Principles
//!
//! - **Stable wire format** - Magic, length fields and string encoding match
//!   what servers put on the socket byte for byte.
//! - **Bounded decoding** - Frame and string lengths are validated against
//!   [`Limits`] before anything is allocated.
//! - **No silent zero-fill** - Reading past the payload is an error carrying
//!   the offset.
//! - **Usage errors are values** - Writing without an open packet returns a
//!   [`WriterError`]; nesting object records is prevented by the borrow
//!   checker.

mod error;
mod frame;
mod header;
mod limits;
mod reader;
mod version;
mod writer;

pub use error::{
    DecodeError, FrameError, FrameResult, LimitKind, VersionError, WireResult, WriterError,
    WriterResult,
};
pub use frame::{Frame, FrameBuffer, FrameReader, Pushed};
pub use header::{encode_frame, ConnectionType, FrameHeader, HEADER_SIZE, MAGIC};
pub use limits::Limits;
pub use reader::PacketReader;
pub use version::Version;
pub use writer::{ObjectWriter, PacketWriter};

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn public_api_exports() {
        let _ = MAGIC;
        let _ = HEADER_SIZE;
        let _ = ConnectionType::Server;
        let _ = Limits::default();
        let _ = PacketWriter::new();
        let _ = PacketReader::new(&[]);
        let _ = FrameBuffer::default();
        let _ = Version::new([2, 1]);

        let _: WireResult<()> = Ok(());
        let _: WriterResult<()> = Ok(());
        let _: FrameResult<()> = Ok(());
    }

    #[test]
    fn header_size_constant_correct() {
        assert_eq!(
            HEADER_SIZE,
            size_of::<u32>() // magic
                + size_of::<u32>() // total length
                + size_of::<u32>() // connection type
                + size_of::<u32>() // padding
                + size_of::<u32>() // remaining length
                + size_of::<u32>() // packet type
        );
    }

    #[test]
    fn writer_and_buffer_integration() {
        let mut writer = PacketWriter::new();
        writer.start(ConnectionType::Client, 0x4c82_1d3c);
        writer.write_i32(0x0b).unwrap().write_i32(2).unwrap();
        let bytes = writer.flush().unwrap();

        let frames = FrameBuffer::default().push(&bytes).frames;
        let mut reader = frames[0].reader(&Limits::default());
        assert_eq!(reader.read_i32().unwrap(), 0x0b);
        assert_eq!(reader.read_i32().unwrap(), 2);
    }
}
