//! Flag vocabularies and ordered flag schemas.

use std::fmt;

/// A named flag that can occupy one bit in a [`BitField`](crate::BitField).
///
/// Implement it with [`define_flags!`](crate::define_flags) rather than by
/// hand.
pub trait Flag: Copy + Eq + fmt::Debug + 'static {
    /// Every flag in the vocabulary, in declaration order.
    fn all() -> &'static [Self];

    /// The flag's identifier as declared.
    fn name(self) -> &'static str;

    /// Looks a flag up by its declared identifier.
    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|flag| flag.name() == name)
    }
}

/// Declares a flag vocabulary enum and implements [`Flag`] for it.
///
/// The generated enum gets an inherent `ALL` constant listing the variants
/// in declaration order, which is the usual source for a [`FlagSchema`].
#[macro_export]
macro_rules! define_flags {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every flag, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
        }

        impl $crate::Flag for $name {
            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

/// The ordered list of flags that defines a bit field's layout.
///
/// Position `i` in the slice is bit `i` on the wire. Two schemas over the same
/// vocabulary may differ (for example across protocol versions); the reader
/// must use the same schema the writer used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSchema<F: 'static> {
    flags: &'static [F],
}

impl<F> FlagSchema<F> {
    /// Creates a schema from an ordered flag slice.
    #[must_use]
    pub const fn new(flags: &'static [F]) -> Self {
        Self { flags }
    }

    /// Number of flags in the schema.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns `true` if the schema declares no flags.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Number of bytes a bit field over this schema occupies on the wire.
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.flags.len().div_ceil(8)
    }

    /// The flags in wire order.
    #[must_use]
    pub const fn flags(&self) -> &'static [F] {
        self.flags
    }
}

impl<F: Flag> FlagSchema<F> {
    /// Returns the bit index of `flag`, or `None` if it is not declared.
    #[must_use]
    pub fn index_of(&self, flag: F) -> Option<usize> {
        self.flags.iter().position(|candidate| *candidate == flag)
    }

    /// Returns `true` if `flag` is part of this schema.
    #[must_use]
    pub fn contains(&self, flag: F) -> bool {
        self.index_of(flag).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    define_flags! {
        enum Colour {
            Red,
            Green,
            Blue,
        }
    }

    const REVERSED: &[Colour] = &[Colour::Blue, Colour::Green, Colour::Red];

    #[test]
    fn all_lists_declaration_order() {
        assert_eq!(Colour::ALL, &[Colour::Red, Colour::Green, Colour::Blue]);
        assert_eq!(<Colour as Flag>::all().len(), 3);
    }

    #[test]
    fn names_match_identifiers() {
        assert_eq!(Colour::Green.name(), "Green");
        assert_eq!(Colour::from_name("Blue"), Some(Colour::Blue));
        assert_eq!(Colour::from_name("blue"), None);
    }

    #[test]
    fn schema_order_defines_index() {
        let natural = FlagSchema::new(Colour::ALL);
        let reversed = FlagSchema::new(REVERSED);
        assert_eq!(natural.index_of(Colour::Red), Some(0));
        assert_eq!(reversed.index_of(Colour::Red), Some(2));
    }

    #[test]
    fn partial_schema_excludes_flags() {
        let schema = FlagSchema::new(&[Colour::Green]);
        assert!(schema.contains(Colour::Green));
        assert!(!schema.contains(Colour::Red));
        assert_eq!(schema.index_of(Colour::Blue), None);
    }

    #[test]
    fn byte_len_rounds_up() {
        define_flags! {
            enum Nine {
                A, B, C, D, E, F, G, H, I,
            }
        }
        assert_eq!(FlagSchema::new(&Nine::ALL[..8]).byte_len(), 1);
        assert_eq!(FlagSchema::new(Nine::ALL).byte_len(), 2);
        assert_eq!(FlagSchema::<Nine>::new(&[]).byte_len(), 0);
    }

    #[test]
    fn schema_const_constructible() {
        const SCHEMA: FlagSchema<Colour> = FlagSchema::new(Colour::ALL);
        assert_eq!(SCHEMA.len(), 3);
        assert!(!SCHEMA.is_empty());
    }
}
