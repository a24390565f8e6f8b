use bitfield::{define_flags, BitField, FlagSchema};
use proptest::prelude::*;

define_flags! {
    enum Wide {
        W00, W01, W02, W03, W04, W05, W06, W07,
        W08, W09, W10, W11, W12, W13, W14, W15,
        W16, W17, W18, W19, W20, W21, W22, W23,
        W24, W25, W26, W27, W28, W29, W30, W31,
        W32, W33, W34, W35, W36, W37, W38, W39,
    }
}

fn schema_of(len: usize) -> FlagSchema<Wide> {
    FlagSchema::new(&Wide::ALL[..len])
}

proptest! {
    #[test]
    fn prop_width_is_ceil_len_over_eight(len in 0usize..=40, picks in prop::collection::vec(any::<bool>(), 40)) {
        let schema = schema_of(len);
        let mut bits = BitField::new(schema);
        for (index, on) in picks.iter().take(len).enumerate() {
            bits.set_index(index, *on).unwrap();
        }

        let mut out = Vec::new();
        bits.write_to(&mut out);
        prop_assert_eq!(out.len(), len.div_ceil(8));
    }

    #[test]
    fn prop_roundtrip_preserves_set_flags(len in 1usize..=40, picks in prop::collection::vec(any::<bool>(), 40)) {
        let schema = schema_of(len);
        let mut bits = BitField::new(schema);
        for (flag, on) in schema.flags().iter().zip(&picks) {
            bits.set(*flag, *on).unwrap();
        }

        let mut out = Vec::new();
        bits.write_to(&mut out);
        let decoded = BitField::read_from(schema, &out).unwrap();

        for (flag, on) in schema.flags().iter().zip(&picks) {
            prop_assert_eq!(decoded.get(*flag).unwrap(), *on);
        }
        prop_assert_eq!(decoded, bits);
    }

    #[test]
    fn prop_read_ignores_trailing_garbage(len in 1usize..=40, raw in prop::collection::vec(any::<u8>(), 5..12)) {
        let schema = schema_of(len);
        let decoded = BitField::read_from(schema, &raw).unwrap();
        prop_assert_eq!(decoded.as_bytes().len(), schema.byte_len());
        prop_assert!(decoded.count_set() <= len);
    }
}
