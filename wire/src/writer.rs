//! Packet writer state machine and scoped object records.
//!
//! A [`PacketWriter`] is either idle or has one packet open. Object records
//! are written through an [`ObjectWriter`] that mutably borrows the writer,
//! so a second object (or a new packet) cannot be opened until the first is
//! ended or dropped.

use std::io::Write;

use bitfield::{BitField, Flag, FlagSchema};

use crate::error::{WriterError, WriterResult};
use crate::header::{encode_frame, ConnectionType};

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Packet {
        connection_type: ConnectionType,
        packet_type: u32,
        payload: Vec<u8>,
    },
}

/// Builds framed packets.
///
/// ```
/// use wire::{ConnectionType, PacketWriter};
///
/// let mut writer = PacketWriter::new();
/// writer.start(ConnectionType::Client, 0x4c82_1d3c);
/// writer.write_i32(0x0f).unwrap().write_i32(0).unwrap();
/// let frame = writer.flush().unwrap();
/// assert_eq!(frame.len(), 24 + 8);
/// ```
#[derive(Debug, Default)]
pub struct PacketWriter {
    state: State,
}

impl PacketWriter {
    /// Creates an idle writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a packet is open.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        matches!(self.state, State::Packet { .. })
    }

    /// Opens a new packet, discarding any unflushed one.
    pub fn start(&mut self, connection_type: ConnectionType, packet_type: u32) -> &mut Self {
        if self.is_started() {
            tracing::debug!(packet_type, "discarding unflushed packet");
        }
        self.state = State::Packet {
            connection_type,
            packet_type,
            payload: Vec::new(),
        };
        self
    }

    /// Appends one byte.
    pub fn write_u8(&mut self, value: u8) -> WriterResult<&mut Self> {
        self.append("write_u8", &[value])
    }

    /// Appends a little-endian `i16`.
    pub fn write_i16(&mut self, value: i16) -> WriterResult<&mut Self> {
        self.append("write_i16", &value.to_le_bytes())
    }

    /// Appends a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) -> WriterResult<&mut Self> {
        self.append("write_u16", &value.to_le_bytes())
    }

    /// Appends a little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> WriterResult<&mut Self> {
        self.append("write_i32", &value.to_le_bytes())
    }

    /// Appends a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> WriterResult<&mut Self> {
        self.append("write_u32", &value.to_le_bytes())
    }

    /// Appends an `f32` as its raw little-endian bits.
    pub fn write_f32(&mut self, value: f32) -> WriterResult<&mut Self> {
        self.append("write_f32", &value.to_bits().to_le_bytes())
    }

    /// Appends a length-prefixed, null-terminated UTF-16LE string.
    pub fn write_string(&mut self, value: &str) -> WriterResult<&mut Self> {
        let payload = self.payload_mut("write_string")?;
        encode_string(payload, value)?;
        Ok(self)
    }

    /// Appends raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> WriterResult<&mut Self> {
        self.append("write_bytes", bytes)
    }

    /// Opens an object record inside the current packet.
    ///
    /// The record is only appended when [`ObjectWriter::end`] is called.
    pub fn start_object<F: Flag>(
        &mut self,
        kind: u8,
        id: i32,
        schema: FlagSchema<F>,
    ) -> WriterResult<ObjectWriter<'_, F>> {
        let payload = self.payload_mut("start_object")?;
        Ok(ObjectWriter {
            payload,
            kind,
            id,
            bits: BitField::new(schema),
            last: None,
            body: Vec::new(),
        })
    }

    /// Closes the open packet and returns the complete frame.
    pub fn flush(&mut self) -> WriterResult<Vec<u8>> {
        match std::mem::take(&mut self.state) {
            State::Idle => Err(WriterError::NotStarted { operation: "flush" }),
            State::Packet {
                connection_type,
                packet_type,
                payload,
            } => encode_frame(connection_type, packet_type, &payload),
        }
    }

    /// Closes the open packet and writes the frame to `out`.
    pub fn flush_to<W: Write>(&mut self, out: &mut W) -> WriterResult<()> {
        let frame = self.flush()?;
        out.write_all(&frame)?;
        out.flush()?;
        Ok(())
    }

    fn payload_mut(&mut self, operation: &'static str) -> WriterResult<&mut Vec<u8>> {
        match &mut self.state {
            State::Packet { payload, .. } => Ok(payload),
            State::Idle => Err(WriterError::NotStarted { operation }),
        }
    }

    fn append(&mut self, operation: &'static str, bytes: &[u8]) -> WriterResult<&mut Self> {
        self.payload_mut(operation)?.extend_from_slice(bytes);
        Ok(self)
    }
}

/// Writes one object record: kind, id, bit field, then present fields.
///
/// Field methods set the flag's bit and buffer the value only when the value
/// is present (or differs from its default). Present fields must be written in
/// schema order, each at most once, since readers take the body in bit order;
/// a field at or before the last one written is
/// [`WriterError::FieldOutOfOrder`]. Dropping the writer without calling
/// [`end`](Self::end) discards the record.
#[derive(Debug)]
pub struct ObjectWriter<'w, F: 'static> {
    payload: &'w mut Vec<u8>,
    kind: u8,
    id: i32,
    bits: BitField<F>,
    last: Option<(usize, F)>,
    body: Vec<u8>,
}

impl<F: Flag> ObjectWriter<'_, F> {
    /// Writes a byte if it differs from `default`.
    pub fn write_u8(&mut self, flag: F, value: u8, default: u8) -> WriterResult<&mut Self> {
        self.write_opt_u8(flag, (value != default).then_some(value))
    }

    /// Writes an `i16` if it differs from `default`.
    pub fn write_i16(&mut self, flag: F, value: i16, default: i16) -> WriterResult<&mut Self> {
        self.write_opt_i16(flag, (value != default).then_some(value))
    }

    /// Writes an `i32` if it differs from `default`.
    pub fn write_i32(&mut self, flag: F, value: i32, default: i32) -> WriterResult<&mut Self> {
        self.write_opt_i32(flag, (value != default).then_some(value))
    }

    /// Writes an `f32` if its bits differ from `default`.
    pub fn write_f32(&mut self, flag: F, value: f32, default: f32) -> WriterResult<&mut Self> {
        self.write_opt_f32(flag, (value.to_bits() != default.to_bits()).then_some(value))
    }

    /// Writes a byte if present.
    pub fn write_opt_u8(&mut self, flag: F, value: Option<u8>) -> WriterResult<&mut Self> {
        self.field(flag, value.map(|v| [v]))
    }

    /// Writes an `i16` if present.
    pub fn write_opt_i16(&mut self, flag: F, value: Option<i16>) -> WriterResult<&mut Self> {
        self.field(flag, value.map(i16::to_le_bytes))
    }

    /// Writes an `i32` if present.
    pub fn write_opt_i32(&mut self, flag: F, value: Option<i32>) -> WriterResult<&mut Self> {
        self.field(flag, value.map(i32::to_le_bytes))
    }

    /// Writes an `f32` if present.
    pub fn write_opt_f32(&mut self, flag: F, value: Option<f32>) -> WriterResult<&mut Self> {
        self.field(flag, value.map(|v| v.to_bits().to_le_bytes()))
    }

    /// Writes a known boolean as `byte_count` bytes, the first holding 0 or 1.
    pub fn write_bool(
        &mut self,
        flag: F,
        value: Option<bool>,
        byte_count: usize,
    ) -> WriterResult<&mut Self> {
        if let Some(value) = value {
            self.claim(flag)?;
            let start = self.body.len();
            self.body.resize(start + byte_count.max(1), 0);
            self.body[start] = u8::from(value);
        }
        Ok(self)
    }

    /// Writes a string if present.
    pub fn write_string(&mut self, flag: F, value: Option<&str>) -> WriterResult<&mut Self> {
        if let Some(value) = value {
            self.claim(flag)?;
            encode_string(&mut self.body, value)?;
        }
        Ok(self)
    }

    /// Writes raw bytes if present.
    pub fn write_bytes(&mut self, flag: F, value: Option<&[u8]>) -> WriterResult<&mut Self> {
        self.field(flag, value)
    }

    /// The bits set so far.
    #[must_use]
    pub const fn bits(&self) -> &BitField<F> {
        &self.bits
    }

    /// Appends the record to the packet.
    pub fn end(self) {
        self.payload.push(self.kind);
        self.payload.extend_from_slice(&self.id.to_le_bytes());
        self.bits.write_to(self.payload);
        self.payload.extend_from_slice(&self.body);
    }

    fn field<B: AsRef<[u8]>>(&mut self, flag: F, value: Option<B>) -> WriterResult<&mut Self> {
        if let Some(bytes) = value {
            self.claim(flag)?;
            self.body.extend_from_slice(bytes.as_ref());
        }
        Ok(self)
    }

    fn claim(&mut self, flag: F) -> WriterResult<()> {
        let index = self.bits.schema().index_of(flag);
        if let (Some(index), Some((last_index, last))) = (index, self.last) {
            if index <= last_index {
                return Err(WriterError::FieldOutOfOrder {
                    field: flag.name(),
                    after: last.name(),
                });
            }
        }
        self.bits.set(flag, true)?;
        self.last = index.map(|index| (index, flag));
        Ok(())
    }
}

/// Appends `value` in the wire string format.
pub(crate) fn encode_string(out: &mut Vec<u8>, value: &str) -> WriterResult<()> {
    let units: Vec<u16> = value.encode_utf16().collect();
    let count = i32::try_from(units.len() + 1)
        .map_err(|_| WriterError::StringTooLong { chars: units.len() })?;

    out.reserve(4 + (units.len() + 1) * 2);
    out.extend_from_slice(&count.to_le_bytes());
    for unit in units {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out.extend_from_slice(&0u16.to_le_bytes());
    Ok(())
}
