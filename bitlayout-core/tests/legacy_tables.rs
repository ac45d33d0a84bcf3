//! Generated text must match the headers the codec was shipped with.

use bitlayout_core::bitrate::BitRateTable;
use bitlayout_core::emit::{first_difference, render_byte_offset_table, render_permutation_set, render_shift_table};
use bitlayout_core::layout::{ByteOffsetCursor, ByteOffsetTable, LayoutConfig, ShiftTable};
use bitlayout_core::permute::{DofCount, PermutationTable};

const SHIFT_VALUES: &str = include_str!("data/shift_values.h");
const BYTE_OFFSET_VALUES: &str = include_str!("data/byte_offset_values.h");
const PERMUTATIONS: &str = include_str!("data/local_bit_rate_permutations.h");

fn assert_same(expected: &str, actual: &str) {
    if let Some((line, exp, act)) = first_difference(expected, actual) {
        panic!("line {} differs:\nexpected: {}\n  actual: {}", line, exp, act);
    }
    assert_eq!(expected, actual);
}

#[test]
fn shift_values_match() {
    let cfg = LayoutConfig::for_bit_rates(&BitRateTable::standard(), ByteOffsetCursor::default()).unwrap();
    assert_same(SHIFT_VALUES, &render_shift_table(&ShiftTable::generate(&cfg)));
}

#[test]
fn carried_byte_offsets_match() {
    let cfg = LayoutConfig::new(19, ByteOffsetCursor::Carried).unwrap();
    assert_same(BYTE_OFFSET_VALUES, &render_byte_offset_table(&ByteOffsetTable::generate(&cfg)));
}

#[test]
fn other_cursors_differ_from_legacy() {
    for &cursor in [ByteOffsetCursor::ZeroBased, ByteOffsetCursor::Phased].iter() {
        let cfg = LayoutConfig::new(19, cursor).unwrap();
        let text = render_byte_offset_table(&ByteOffsetTable::generate(&cfg));
        // declaration and the first two width columns agree, the accumulated cursor diverges at width 3
        assert_eq!(first_difference(BYTE_OFFSET_VALUES, &text).map(|(line, _, _)| line), Some(3));
    }
}

#[test]
fn permutations_match() {
    let bit_rates = BitRateTable::standard();
    let tables = vec![PermutationTable::enumerate(&bit_rates, DofCount::Two),
                      PermutationTable::enumerate(&bit_rates, DofCount::Three)];
    assert_same(PERMUTATIONS, &render_permutation_set(&tables));
}
