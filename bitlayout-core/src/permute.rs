//! Enumeration of per-channel bit rate combinations sorted by packed size.
//!
//! A transform has up to three independently quantised channels (rotation, translation and scale)
//! and each of them packs three components. The encoder walks every combination from the cheapest
//! to the most expensive one and stops once the error is acceptable, so the table is sorted by the
//! total number of bits per transform with ties broken by the bit rates themselves.
//!
//! # Examples
//!
//! ```
//! use bitlayout_core::bitrate::BitRateTable;
//! use bitlayout_core::permute::{DofCount, PermutationTable};
//!
//! let table = BitRateTable::standard();
//! let perms = PermutationTable::enumerate(&table, DofCount::Two);
//! assert_eq!(perms.len(), 19 * 19);
//! assert_eq!(perms.entries()[0].rates(), &[0, 0]);
//! assert_eq!(perms.entries()[1].total_bits, 9);
//! ```
use std::convert::TryFrom;
use std::fmt;

use serde::Deserialize;
use tracing::debug;

use crate::bitrate::{BitRateTable, INVALID_BIT_RATE, LOWEST_BIT_RATE};
use crate::error::LayoutError;

/// Number of packed components per channel.
pub const COMPONENTS_PER_DOF: u32 = 3;

/// Number of channels packed per transform.
#[derive(Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash,Deserialize)]
#[serde(try_from = "u8")]
pub enum DofCount {
    /// Single channel.
    One,
    /// Rotation and translation.
    Two,
    /// Rotation, translation and scale.
    Three,
}

impl DofCount {
    /// Every supported count in increasing order.
    pub const ALL: [DofCount; 3] = [DofCount::One, DofCount::Two, DofCount::Three];

    /// Returns the number of channels.
    pub fn count(self) -> usize {
        match self {
            DofCount::One   => 1,
            DofCount::Two   => 2,
            DofCount::Three => 3,
        }
    }
    /// Returns the name of the generated array.
    pub fn table_name(self) -> &'static str {
        match self {
            DofCount::One   => "k_local_bit_rate_permutations_single_dof",
            DofCount::Two   => "k_local_bit_rate_permutations_no_scale",
            DofCount::Three => "k_local_bit_rate_permutations",
        }
    }
}

impl TryFrom<u8> for DofCount {
    type Error = LayoutError;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            1 => Ok(DofCount::One),
            2 => Ok(DofCount::Two),
            3 => Ok(DofCount::Three),
            _ => Err(LayoutError::InvalidDofCount(val)),
        }
    }
}

impl fmt::Display for DofCount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// One bit rate combination.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct PermutationEntry {
    rates:          [u8; 3],
    dof:            DofCount,
    /// Packed size of one transform in bits.
    pub total_bits: u32,
}

impl PermutationEntry {
    /// Returns the bit rate of every channel in rotation, translation, scale order.
    pub fn rates(&self) -> &[u8] { &self.rates[..self.dof.count()] }
    /// Returns the number of channels.
    pub fn dof(&self) -> DofCount { self.dof }
    fn sort_key(&self) -> (u32, [u8; 3]) { (self.total_bits, self.rates) }
}

/// What the encoder already knows about a channel before searching.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum TrackHint {
    /// Any bit rate fits.
    Any,
    /// The channel varies within the segment so the constant bit rate 0 is excluded.
    Variable,
    /// The channel is constant or default for the whole clip and only bit rate 0 fits.
    Constant,
}

impl TrackHint {
    /// Derives the hint from the initial bit rate the encoder assigned to a channel.
    ///
    /// [`LOWEST_BIT_RATE`] means the channel is not constant in the segment and
    /// [`INVALID_BIT_RATE`] means it is constant for the whole clip.
    ///
    /// [`LOWEST_BIT_RATE`]: ../bitrate/constant.LOWEST_BIT_RATE.html
    /// [`INVALID_BIT_RATE`]: ../bitrate/constant.INVALID_BIT_RATE.html
    pub fn from_bit_rate(bit_rate: u8) -> Self {
        match bit_rate {
            LOWEST_BIT_RATE  => TrackHint::Variable,
            INVALID_BIT_RATE => TrackHint::Constant,
            _ => TrackHint::Any,
        }
    }
    /// Reports whether a channel with this hint may use the bit rate.
    pub fn accepts(self, bit_rate: u8) -> bool {
        match self {
            TrackHint::Any      => true,
            TrackHint::Variable => bit_rate != 0,
            TrackHint::Constant => bit_rate == 0,
        }
    }
}

/// Size-sorted table of every bit rate combination for one channel count.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct PermutationTable {
    dof:     DofCount,
    entries: Vec<PermutationEntry>,
}

impl PermutationTable {
    /// Enumerates all `num_bit_rates ^ dof` combinations and sorts them.
    ///
    /// The first channel varies slowest during enumeration. Sorting uses an explicit
    /// `(total_bits, rates)` key so the order does not depend on sort stability.
    pub fn enumerate(table: &BitRateTable, dof: DofCount) -> Self {
        let num_rates = table.num_bit_rates();
        let nch = dof.count();
        let total = num_rates.pow(nch as u32);
        let mut entries = Vec::with_capacity(total);
        let mut idx = [0usize; 3];
        for _ in 0..total {
            let mut rates = [0u8; 3];
            let mut total_bits = 0;
            for ch in 0..nch {
                rates[ch] = idx[ch] as u8;
                total_bits += u32::from(table.widths()[idx[ch]]) * COMPONENTS_PER_DOF;
            }
            entries.push(PermutationEntry { rates, dof, total_bits });

            for ch in (0..nch).rev() {
                idx[ch] += 1;
                if idx[ch] < num_rates {
                    break;
                }
                idx[ch] = 0;
            }
        }
        entries.sort_unstable_by_key(|e| e.sort_key());
        debug!(dof = nch, bit_rates = num_rates, entries = entries.len(), "enumerated bit rate permutations");
        Self { dof, entries }
    }
    /// Returns the number of channels per entry.
    pub fn dof(&self) -> DofCount { self.dof }
    /// Returns all entries in search order.
    pub fn entries(&self) -> &[PermutationEntry] { &self.entries }
    /// Returns the number of entries.
    pub fn len(&self) -> usize { self.entries.len() }
    /// Reports whether the table is empty.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    /// Checks that entries are ordered by size first and by bit rates second.
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].sort_key() < w[1].sort_key())
    }
    /// Iterates in search order over the entries the channel hints allow.
    ///
    /// Channels without a hint accept any bit rate.
    pub fn candidates<'a>(&'a self, hints: &'a [TrackHint]) -> impl Iterator<Item = &'a PermutationEntry> + 'a {
        self.entries.iter().filter(move |e| {
                e.rates().iter().zip(hints.iter()).all(|(&rate, hint)| hint.accepts(rate))
            })
    }
    /// Iterates over groups of entries with the same packed size.
    pub fn size_runs(&self) -> SizeRuns {
        SizeRuns { rest: &self.entries }
    }
}

/// Iterator over runs of equally sized permutations.
pub struct SizeRuns<'a> {
    rest: &'a [PermutationEntry],
}

impl<'a> Iterator for SizeRuns<'a> {
    type Item = (u32, &'a [PermutationEntry]);

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.first()?;
        let len = self.rest.iter().take_while(|e| e.total_bits == first.total_bits).count();
        let (run, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some((first.total_bits, run))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dof_count() {
        assert_eq!(DofCount::try_from(1), Ok(DofCount::One));
        assert_eq!(DofCount::try_from(3), Ok(DofCount::Three));
        assert_eq!(DofCount::try_from(0), Err(LayoutError::InvalidDofCount(0)));
        assert_eq!(DofCount::try_from(4), Err(LayoutError::InvalidDofCount(4)));
        assert_eq!(DofCount::Two.to_string(), "2");
    }
    #[test]
    fn test_sizes() {
        let table = BitRateTable::standard();
        for &dof in DofCount::ALL.iter() {
            let perms = PermutationTable::enumerate(&table, dof);
            assert_eq!(perms.len(), 19usize.pow(dof.count() as u32));
            assert!(perms.is_sorted());
            assert!(perms.entries().iter().all(|e| e.dof() == dof && e.rates().len() == dof.count()));
        }
    }
    #[test]
    fn test_no_scale_order() {
        let table = BitRateTable::standard();
        let perms = PermutationTable::enumerate(&table, DofCount::Two);
        let head: Vec<(&[u8], u32)> = perms.entries()[..6].iter().map(|e| (e.rates(), e.total_bits)).collect();
        assert_eq!(head, vec![
                (&[0u8, 0][..], 0),
                (&[0, 1][..], 9),
                (&[1, 0][..], 9),
                (&[0, 2][..], 12),
                (&[2, 0][..], 12),
                (&[0, 3][..], 15),
            ]);
        let last = perms.entries()[perms.len() - 1];
        assert_eq!(last.rates(), &[18, 18]);
        assert_eq!(last.total_bits, 192);
    }
    #[test]
    fn test_full_order() {
        let table = BitRateTable::standard();
        let perms = PermutationTable::enumerate(&table, DofCount::Three);
        assert_eq!(perms.entries()[0].rates(), &[0, 0, 0]);
        let nine: Vec<&[u8]> = perms.entries()[1..4].iter().map(|e| e.rates()).collect();
        assert_eq!(nine, vec![&[0u8, 0, 1][..], &[0, 1, 0][..], &[1, 0, 0][..]]);
        assert_eq!(perms.entries()[perms.len() - 1].total_bits, 288);
    }
    #[test]
    fn test_candidates() {
        let table = BitRateTable::standard();
        let perms = PermutationTable::enumerate(&table, DofCount::Three);
        let hints = [TrackHint::from_bit_rate(1), TrackHint::from_bit_rate(INVALID_BIT_RATE), TrackHint::from_bit_rate(0)];
        assert_eq!(hints, [TrackHint::Variable, TrackHint::Constant, TrackHint::Any]);
        let cands: Vec<&PermutationEntry> = perms.candidates(&hints).collect();
        assert_eq!(cands.len(), 18 * 19);
        assert!(cands.iter().all(|e| e.rates()[0] != 0 && e.rates()[1] == 0));
        assert_eq!(cands[0].rates(), &[1, 0, 0]);
        assert!(cands.windows(2).all(|w| w[0].total_bits <= w[1].total_bits));

        assert_eq!(perms.candidates(&[]).count(), perms.len());
    }
    #[test]
    fn test_size_runs() {
        let table = BitRateTable::new("tiny", &[0, 3, 6, 32]).unwrap();
        let perms = PermutationTable::enumerate(&table, DofCount::Two);
        let runs: Vec<(u32, usize)> = perms.size_runs().map(|(bits, run)| (bits, run.len())).collect();
        assert_eq!(runs[0], (0, 1));
        assert_eq!(runs[1], (9, 2));
        // 18 bits: (0,6), (3,3), (6,0)
        assert_eq!(runs[2], (18, 3));
        let flat: Vec<PermutationEntry> = perms.size_runs().flat_map(|(_, run)| run.iter().copied()).collect();
        assert_eq!(flat.as_slice(), perms.entries());
    }

    proptest! {
        #[test]
        fn prop_sorted_and_complete(widths in proptest::collection::btree_set(0u8..=32, 2..9), dof in 1u8..=3) {
            let widths: Vec<u8> = widths.into_iter().collect();
            let table = BitRateTable::new("prop", &widths).unwrap();
            let dof = DofCount::try_from(dof).unwrap();
            let perms = PermutationTable::enumerate(&table, dof);
            prop_assert_eq!(perms.len(), widths.len().pow(dof.count() as u32));
            prop_assert!(perms.is_sorted());
            for e in perms.entries() {
                let bits: u32 = e.rates().iter().map(|&r| u32::from(widths[usize::from(r)]) * 3).sum();
                prop_assert_eq!(bits, e.total_bits);
            }
        }
    }
}
