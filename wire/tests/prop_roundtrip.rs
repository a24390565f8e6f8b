use proptest::prelude::*;
use wire::{ConnectionType, FrameBuffer, PacketReader, PacketWriter, Version};

proptest! {
    #[test]
    fn prop_chunked_stream_yields_same_frames(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..8),
        chunk in 1usize..40,
    ) {
        let mut stream = Vec::new();
        for (index, payload) in payloads.iter().enumerate() {
            let mut writer = PacketWriter::new();
            writer.start(ConnectionType::Client, index as u32);
            writer.write_bytes(payload).unwrap();
            stream.extend(writer.flush().unwrap());
        }

        let mut buffer = FrameBuffer::default();
        let mut frames = Vec::new();
        for piece in stream.chunks(chunk) {
            let pushed = buffer.push(piece);
            prop_assert!(pushed.is_ok());
            frames.extend(pushed.frames);
        }

        prop_assert_eq!(frames.len(), payloads.len());
        for (index, (frame, payload)) in frames.iter().zip(&payloads).enumerate() {
            prop_assert_eq!(frame.header.packet_type, index as u32);
            prop_assert_eq!(&frame.payload[..], payload.as_slice());
        }
    }

    #[test]
    fn prop_strings_roundtrip(text in "\\PC{0,40}") {
        let mut writer = PacketWriter::new();
        writer.start(ConnectionType::Server, 1);
        writer.write_string(&text).unwrap();
        let frame = writer.flush().unwrap();

        let mut reader = PacketReader::new(&frame[wire::HEADER_SIZE..]);
        prop_assert_eq!(reader.read_string().unwrap(), text);
        prop_assert!(!reader.has_more());
    }

    #[test]
    fn prop_version_zero_fill_is_equal(parts in prop::collection::vec(0u32..10, 0..4), zeros in 0usize..3) {
        let mut padded = parts.clone();
        padded.extend(std::iter::repeat(0).take(zeros));
        prop_assert_eq!(Version::new(parts), Version::new(padded));
    }

    #[test]
    fn prop_version_order_matches_lexicographic(a in prop::collection::vec(0u32..5, 3), b in prop::collection::vec(0u32..5, 3)) {
        prop_assert_eq!(Version::new(a.clone()).cmp(&Version::new(b.clone())), a.cmp(&b));
    }
}
