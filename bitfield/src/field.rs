//! The packed presence bit field.

use crate::error::{BitFieldError, BitFieldResult};
use crate::schema::{Flag, FlagSchema};

/// A packed set of flags over a fixed [`FlagSchema`].
///
/// Bit `i` lives in byte `i / 8` at position `i % 8`, least significant bit
/// first. The byte length is fixed by the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitField<F: 'static> {
    schema: FlagSchema<F>,
    bytes: Vec<u8>,
}

impl<F: Flag> BitField<F> {
    /// Creates a bit field with every flag cleared.
    #[must_use]
    pub fn new(schema: FlagSchema<F>) -> Self {
        Self {
            schema,
            bytes: vec![0; schema.byte_len()],
        }
    }

    /// Reads a bit field from the front of `input`.
    ///
    /// Consumes exactly `schema.byte_len()` bytes. Bits beyond the schema
    /// width in the last byte are ignored.
    pub fn read_from(schema: FlagSchema<F>, input: &[u8]) -> BitFieldResult<Self> {
        let needed = schema.byte_len();
        if input.len() < needed {
            return Err(BitFieldError::Truncated {
                needed,
                available: input.len(),
            });
        }

        let mut bytes = input[..needed].to_vec();
        let tail_bits = schema.len() % 8;
        if tail_bits != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= (1u8 << tail_bits) - 1;
            }
        }
        Ok(Self { schema, bytes })
    }

    /// The schema this bit field was built from.
    #[must_use]
    pub const fn schema(&self) -> FlagSchema<F> {
        self.schema
    }

    /// Sets or clears `flag`.
    pub fn set(&mut self, flag: F, value: bool) -> BitFieldResult<()> {
        let index = self.index_for(flag)?;
        self.set_index(index, value)
    }

    /// Returns whether `flag` is set.
    pub fn get(&self, flag: F) -> BitFieldResult<bool> {
        let index = self.index_for(flag)?;
        self.get_index(index)
    }

    /// Sets or clears the bit at a raw index.
    pub fn set_index(&mut self, index: usize, value: bool) -> BitFieldResult<()> {
        self.check_index(index)?;
        let mask = 1u8 << (index % 8);
        let byte = &mut self.bytes[index / 8];
        if value {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        Ok(())
    }

    /// Returns the bit at a raw index.
    pub fn get_index(&self, index: usize) -> BitFieldResult<bool> {
        self.check_index(index)?;
        Ok(self.bytes[index / 8] & (1u8 << (index % 8)) != 0)
    }

    /// Number of flags currently set.
    #[must_use]
    pub fn count_set(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Returns `true` if no flag is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// Iterates the set flags in schema order.
    pub fn iter_set(&self) -> impl Iterator<Item = F> + '_ {
        self.schema
            .flags()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.bytes[index / 8] & (1u8 << (index % 8)) != 0)
            .map(|(_, flag)| *flag)
    }

    /// Appends the packed bytes to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.bytes);
    }

    /// The packed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn index_for(&self, flag: F) -> BitFieldResult<usize> {
        self.schema
            .index_of(flag)
            .ok_or_else(|| BitFieldError::UnknownFlag {
                flag: flag.name(),
                schema_len: self.schema.len(),
            })
    }

    const fn check_index(&self, index: usize) -> BitFieldResult<()> {
        if index >= self.schema.len() {
            return Err(BitFieldError::IndexOutOfRange {
                index,
                schema_len: self.schema.len(),
            });
        }
        Ok(())
    }
}
