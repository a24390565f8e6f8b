use wire::{ConnectionType, FrameBuffer, FrameHeader, Limits, PacketWriter, HEADER_SIZE, MAGIC};

fn written_frame(payload_len: usize) -> Vec<u8> {
    let mut writer = PacketWriter::new();
    writer.start(ConnectionType::Server, 0x8080_3df9);
    writer.write_bytes(&vec![0x42; payload_len]).unwrap();
    writer.flush().unwrap()
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

#[test]
fn length_fields_for_representative_payloads() {
    for payload_len in [0usize, 1, 10_000] {
        let frame = written_frame(payload_len);
        assert_eq!(frame.len(), HEADER_SIZE + payload_len);
        assert_eq!(le_u32(&frame, 0), MAGIC);
        assert_eq!(le_u32(&frame, 4) as usize, payload_len + 24);
        assert_eq!(le_u32(&frame, 8), 1);
        assert_eq!(le_u32(&frame, 12), 0);
        assert_eq!(le_u32(&frame, 16) as usize, payload_len + 4);
        assert_eq!(le_u32(&frame, 20), 0x8080_3df9);
    }
}

#[test]
fn large_payload_through_buffer_byte_by_byte() {
    let frame = written_frame(10_000);
    let mut buffer = FrameBuffer::default();
    let mut frames = Vec::new();
    for byte in &frame {
        frames.extend(buffer.push(std::slice::from_ref(byte)).frames);
    }
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].payload.len(), 10_000);
    assert!(buffer.is_empty());
}

#[test]
fn header_decode_matches_writer() {
    let frame = written_frame(1);
    let header = FrameHeader::decode(&frame).unwrap();
    assert_eq!(header.payload_len, 1);
    assert_eq!(header.connection_type, ConnectionType::Server);
}

#[test]
fn testing_limits_reject_large_frame() {
    let frame = written_frame(10_000);
    let mut buffer = FrameBuffer::new(Limits::for_testing());
    assert!(buffer.push(&frame).error.is_some());
    assert!(buffer.is_empty());
}
