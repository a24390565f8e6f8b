#![no_main]

use codec::{read_object, ObjectLayout};
use libfuzzer_sys::fuzz_target;
use wire::{Limits, PacketReader};
use world::NpcShipFlag;

fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();
    let mut reader = PacketReader::with_limits(data, &limits);
    let mut idx = 0usize;

    // Input bytes pick the next read; the reader consumes the same buffer.
    while idx < data.len() && idx < 1024 && reader.has_more() {
        let op = data[idx] % 8;
        idx += 1;

        let ok = match op {
            0 => reader.read_u8().is_ok(),
            1 => reader.read_i16().is_ok(),
            2 => reader.read_i32().is_ok(),
            3 => reader.read_f32().is_ok(),
            4 => reader.read_string().is_ok(),
            5 => reader.read_bit_field(NpcShipFlag::MODERN_SCHEMA).is_ok(),
            6 => read_object(&mut reader, ObjectLayout::Legacy).is_ok(),
            _ => read_object(&mut reader, ObjectLayout::Modern).is_ok(),
        };
        if !ok {
            assert!(reader.position() <= data.len());
        }
    }
});
