//! Bit rate tables.
//!
//! A bit rate is an index into an ordered list of field widths. Every quantised track channel stores
//! one bit rate and all of its three components are packed with the corresponding width.
//! Rate 0 is reserved for tracks that are constant within a segment and the highest rate stores raw values.
//!
//! The list changes between codec versions, so it is always passed around explicitly.
//!
//! # Examples
//!
//! ```
//! use bitlayout_core::bitrate::BitRateTable;
//!
//! let table = BitRateTable::standard();
//! assert_eq!(table.num_bit_rates(), 19);
//! assert_eq!(table.num_bits_at(table.highest_bit_rate()), Some(32));
//! ```
use std::fmt;

use crate::error::{LayoutError, LayoutResult};

/// The lowest bit rate usable by a track that is not constant.
pub const LOWEST_BIT_RATE: u8 = 1;
/// Bit rate value marking a track that is constant or default for the whole clip.
pub const INVALID_BIT_RATE: u8 = 255;

/// Widths of the release bit rate table.
pub const STANDARD_WIDTHS: [u8; 19] = [ 0, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 32 ];
/// Widths of the dense bit rate table with every width up to 21 bits.
pub const DENSE_WIDTHS: [u8; 23] = [ 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 32 ];

/// Names of the built-in bit rate tables.
pub const PRESET_NAMES: &[&str] = &[ "standard", "dense" ];

/// Ordered list of field widths addressed by bit rate.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct BitRateTable {
    name:   String,
    widths: Vec<u8>,
}

impl BitRateTable {
    /// Validates the widths and constructs a new table.
    ///
    /// Widths must be strictly increasing, not exceed 32 bits and there must be between 2 and 255 of them.
    pub fn new(name: &str, widths: &[u8]) -> LayoutResult<Self> {
        if widths.len() < 2 {
            return Err(LayoutError::TooFewBitRates(widths.len()));
        }
        if widths.len() > usize::from(INVALID_BIT_RATE) {
            return Err(LayoutError::TooManyBitRates(widths.len()));
        }
        for (index, pair) in widths.windows(2).enumerate() {
            if pair[0] >= pair[1] {
                return Err(LayoutError::UnorderedBitRates { index: index + 1, prev: pair[0], next: pair[1] });
            }
        }
        if let Some(&width) = widths.iter().find(|&&w| w > 32) {
            return Err(LayoutError::WidthTooLarge(width));
        }
        Ok(Self { name: name.to_owned(), widths: widths.to_vec() })
    }
    /// Returns the release table `[0, 3, 4, ..., 19, 32]`.
    pub fn standard() -> Self {
        Self { name: "standard".to_owned(), widths: STANDARD_WIDTHS.to_vec() }
    }
    /// Returns the dense table `[0, 1, 2, ..., 21, 32]`.
    pub fn dense() -> Self {
        Self { name: "dense".to_owned(), widths: DENSE_WIDTHS.to_vec() }
    }
    /// Looks up a built-in table by name.
    pub fn preset(name: &str) -> LayoutResult<Self> {
        match name {
            "standard" => Ok(Self::standard()),
            "dense"    => Ok(Self::dense()),
            _ => Err(LayoutError::UnknownPreset(name.to_owned())),
        }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str { &self.name }
    /// Returns the widths in bit rate order.
    pub fn widths(&self) -> &[u8] { &self.widths }
    /// Returns the number of bit rates.
    pub fn num_bit_rates(&self) -> usize { self.widths.len() }
    /// Returns the bit rate storing raw values.
    pub fn highest_bit_rate(&self) -> u8 { (self.widths.len() - 1) as u8 }
    /// Returns the width in bits of a single component at the given bit rate.
    pub fn num_bits_at(&self, bit_rate: u8) -> Option<u8> {
        self.widths.get(usize::from(bit_rate)).copied()
    }
    /// Reports whether the bit rate marks a track constant within the segment.
    pub fn is_constant_bit_rate(&self, bit_rate: u8) -> bool { bit_rate == 0 }
    /// Reports whether the bit rate stores raw full precision values.
    pub fn is_raw_bit_rate(&self, bit_rate: u8) -> bool { bit_rate == self.highest_bit_rate() }
    /// Raises the bit rate by `increment` without going past the raw bit rate.
    ///
    /// Rates already at or above the raw one (including [`INVALID_BIT_RATE`]) are returned unchanged.
    ///
    /// [`INVALID_BIT_RATE`]: ./constant.INVALID_BIT_RATE.html
    pub fn increment_and_clamp(&self, bit_rate: u8, increment: u8) -> u8 {
        let highest = self.highest_bit_rate();
        if bit_rate >= highest {
            bit_rate
        } else {
            bit_rate.saturating_add(increment).min(highest)
        }
    }
    /// Returns the maximum width that is not a raw width.
    ///
    /// This is the widest field the packed readers ever handle.
    pub fn max_packed_width(&self) -> u8 {
        let n = self.widths.len();
        self.widths[n - 2]
    }
}

impl Default for BitRateTable {
    fn default() -> Self { Self::standard() }
}

impl fmt::Display for BitRateTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let list: Vec<String> = self.widths.iter().map(|w| w.to_string()).collect();
        write!(f, "{} {{ {} }}", self.name, list.join(", "))
    }
}
