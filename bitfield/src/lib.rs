//! Flag schemas and presence bit fields for the Artemis wire protocol.
//!
//! Object records on the wire carry a bit field announcing which optional
//! fields follow. This crate provides the schema side ([`Flag`],
//! [`FlagSchema`], [`define_flags!`]) and the packed value ([`BitField`]).
//!
//! # Design Principles
//!
//! - **Schema decides the width** - A bit field always occupies
//!   `ceil(schema.len() / 8)` bytes, however many flags are set.
//! - **Declared order is wire order** - Bit positions come from the schema
//!   slice, never from enum discriminants.
//! - **No domain knowledge** - This crate knows nothing about ships or packets.
//!
//! # Example
//!
//! ```
//! use bitfield::{define_flags, BitField, FlagSchema};
//!
//! define_flags! {
//!     pub enum Demo {
//!         Alpha,
//!         Beta,
//!         Gamma,
//!     }
//! }
//!
//! const SCHEMA: FlagSchema<Demo> = FlagSchema::new(Demo::ALL);
//!
//! let mut bits = BitField::new(SCHEMA);
//! bits.set(Demo::Gamma, true).unwrap();
//!
//! let mut out = Vec::new();
//! bits.write_to(&mut out);
//! assert_eq!(out, vec![0b0000_0100]);
//!
//! let decoded = BitField::read_from(SCHEMA, &out).unwrap();
//! assert!(decoded.get(Demo::Gamma).unwrap());
//! ```

mod error;
mod field;
mod schema;

pub use error::{BitFieldError, BitFieldResult};
pub use field::BitField;
pub use schema::{Flag, FlagSchema};
