//! Field-level merge of partial updates.

use crate::bool_state::BoolState;

/// Folds a partial update into an existing value.
///
/// Specified parts of `incoming` overwrite; unspecified parts leave `self`
/// untouched. Merging the same update twice is the same as merging it once.
pub trait Merge {
    fn merge(&mut self, incoming: Self);
}

impl<T> Merge for Option<T> {
    fn merge(&mut self, incoming: Self) {
        if incoming.is_some() {
            *self = incoming;
        }
    }
}

impl Merge for BoolState {
    fn merge(&mut self, incoming: Self) {
        if incoming.is_known() {
            *self = incoming;
        }
    }
}

impl<T: Merge, const N: usize> Merge for [T; N] {
    fn merge(&mut self, incoming: Self) {
        for (slot, value) in self.iter_mut().zip(incoming) {
            slot.merge(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_some_overwrites() {
        let mut value = Some(1);
        value.merge(Some(2));
        assert_eq!(value, Some(2));
    }

    #[test]
    fn option_none_keeps_existing() {
        let mut value = Some(String::from("Artemis"));
        value.merge(None);
        assert_eq!(value.as_deref(), Some("Artemis"));
    }

    #[test]
    fn bool_state_unknown_keeps_existing() {
        let mut state = BoolState::True;
        state.merge(BoolState::Unknown);
        assert_eq!(state, BoolState::True);
        state.merge(BoolState::False);
        assert_eq!(state, BoolState::False);
    }

    #[test]
    fn arrays_merge_per_slot() {
        let mut freqs = [Some(0.1), None, Some(0.3)];
        freqs.merge([None, Some(0.2), Some(0.9)]);
        assert_eq!(freqs, [Some(0.1), Some(0.2), Some(0.9)]);
    }
}
