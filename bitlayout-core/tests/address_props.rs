//! Property tests checking address tables against simulated cursors and packed data.

use proptest::prelude::*;

use bitlayout_core::io::bitreader::BitReader;
use bitlayout_core::io::bitwriter::BitWriter;
use bitlayout_core::layout::{decode_vec3, vec3_addresses, ByteOffsetCursor, ByteOffsetTable, LayoutConfig, ShiftTable, MAX_WINDOW_WIDTH};

proptest! {
    #[test]
    fn prop_shift_matches_formula(max_width in 0u8..=MAX_WINDOW_WIDTH, phase in 0u8..8, width in 0u8..=MAX_WINDOW_WIDTH) {
        prop_assume!(width <= max_width);
        let shifts = ShiftTable::generate(&LayoutConfig::new(max_width, ByteOffsetCursor::Phased).unwrap());
        let cell = shifts.get(phase, width).unwrap();
        let (p, w) = (i32::from(phase), i32::from(width));
        prop_assert_eq!(i32::from(cell[0]), (32 - w) - p % 8);
        prop_assert_eq!(i32::from(cell[1]), (32 - w) - (p + w) % 8);
        prop_assert_eq!(i32::from(cell[2]), (32 - w) - (p + 2 * w) % 8);
        let addrs = vec3_addresses(phase, width);
        for i in 0..3 {
            prop_assert_eq!(addrs[i].shift, i32::from(cell[i]));
        }
    }

    #[test]
    fn prop_zero_based_ignores_phase(phase in 0u8..8, width in 0u8..19) {
        let offsets = ByteOffsetTable::generate(&LayoutConfig::new(19, ByteOffsetCursor::ZeroBased).unwrap());
        prop_assert_eq!(offsets.get(phase, width), offsets.get(0, width));
    }

    #[test]
    fn prop_phased_decodes_packed_data(lead in 0u32..64, width in 1u8..20, a in any::<u32>(), b in any::<u32>(), c in any::<u32>()) {
        let cfg = LayoutConfig::new(20, ByteOffsetCursor::Phased).unwrap();
        let shifts = ShiftTable::generate(&cfg);
        let offsets = ByteOffsetTable::generate(&cfg);
        let mask = (1u32 << width) - 1;
        let vals = [a & mask, b & mask, c & mask];

        let mut bw = BitWriter::new(Vec::new());
        bw.pad_to(lead as usize);
        bw.write_vec3(vals, width);
        let data = bw.end();

        prop_assert_eq!(decode_vec3(&data, lead, width, &shifts, &offsets).unwrap(), vals);
        let mut br = BitReader::new(&data);
        br.seek(lead).unwrap();
        prop_assert_eq!(br.read_vec3(width).unwrap(), vals);
    }
}
