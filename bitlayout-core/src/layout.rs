//! Addressing tables for three fields of the same width packed at an arbitrary bit phase.
//!
//! A decoder reading a packed three component sample at bit cursor `c` loads a big-endian 32-bit
//! window at byte `c / 8` and shifts it right by `(32 - width) - c % 8` before masking.
//! The cursor then advances by `width` for the next component.
//! The tables here precompute those shifts and byte offsets for every starting phase and width.
//!
//! # Examples
//!
//! ```
//! use bitlayout_core::layout::{LayoutConfig, ShiftTable};
//!
//! let shifts = ShiftTable::generate(&LayoutConfig::default());
//! assert_eq!(shifts.get(0, 0), Some([32, 32, 32]));
//! assert!(shifts.mismatches().is_empty());
//! ```
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::bitrate::BitRateTable;
use crate::error::{LayoutError, LayoutResult};
use crate::io::bitreader::{read_window, BitReaderError, BitReaderResult};

/// Number of distinct bit phases inside a byte.
pub const NUM_PHASES: usize = 8;
/// Number of components in a packed sample.
pub const NUM_COMPONENTS: usize = 3;
/// Widest field that can be extracted from a 32-bit window at every phase.
pub const MAX_WINDOW_WIDTH: u8 = 25;
/// Default maximum field width covered by the tables.
pub const DEFAULT_MAX_WIDTH: u8 = 19;

/// Location of a packed field relative to a 32-bit big-endian read window.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct PackedFieldAddress {
    /// Byte where the read window starts.
    pub byte_offset: u32,
    /// Right shift that moves the field to the low bits of the window.
    pub shift:       i32,
}

impl fmt::Display for PackedFieldAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "byte {} shift {}", self.byte_offset, self.shift)
    }
}

/// Computes the address of a `width` bit field starting at the absolute bit cursor.
pub fn field_address(bit_cursor: u32, width: u8) -> PackedFieldAddress {
    PackedFieldAddress {
        byte_offset: bit_cursor / 8,
        shift:       (32 - i32::from(width)) - (bit_cursor % 8) as i32,
    }
}

/// Computes addresses of three sequential `width` bit fields with the first one starting at `phase`.
///
/// This is direct cursor arithmetic and serves as the reference the tables are checked against.
pub fn vec3_addresses(phase: u8, width: u8) -> [PackedFieldAddress; NUM_COMPONENTS] {
    let mut cursor = u32::from(phase);
    let mut ret = [PackedFieldAddress { byte_offset: 0, shift: 0 }; NUM_COMPONENTS];
    for (i, addr) in ret.iter_mut().enumerate() {
        if i > 0 {
            cursor += u32::from(width);
        }
        *addr = field_address(cursor, width);
    }
    ret
}

/// How the byte offset generator positions its bit cursor for each table cell.
///
/// Which of these the consuming decoder expects is an open question, so it is a configuration choice.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByteOffsetCursor {
    /// The cursor restarts at zero for every cell and the phase does not matter.
    ZeroBased,
    /// The cursor starts at the phase for every row and keeps advancing across all widths of that row.
    ///
    /// This reproduces the legacy generated header.
    Carried,
    /// The cursor restarts at the phase for every cell, matching direct cursor arithmetic.
    Phased,
}

impl Default for ByteOffsetCursor {
    fn default() -> Self { ByteOffsetCursor::ZeroBased }
}

impl FromStr for ByteOffsetCursor {
    type Err = LayoutError;

    fn from_str(s: &str) -> LayoutResult<Self> {
        match s {
            "zero-based" => Ok(ByteOffsetCursor::ZeroBased),
            "carried"    => Ok(ByteOffsetCursor::Carried),
            "phased"     => Ok(ByteOffsetCursor::Phased),
            _ => Err(LayoutError::InvalidValue(s.to_owned())),
        }
    }
}

impl fmt::Display for ByteOffsetCursor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ByteOffsetCursor::ZeroBased => write!(f, "zero-based"),
            ByteOffsetCursor::Carried   => write!(f, "carried"),
            ByteOffsetCursor::Phased    => write!(f, "phased"),
        }
    }
}

/// Parameters shared by the shift and byte offset tables.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct LayoutConfig {
    max_width:          u8,
    byte_offset_cursor: ByteOffsetCursor,
}

impl LayoutConfig {
    /// Constructs a new configuration.
    ///
    /// The shift table covers widths `0..=max_width` and the byte offset table widths `0..max_width`.
    pub fn new(max_width: u8, byte_offset_cursor: ByteOffsetCursor) -> LayoutResult<Self> {
        if max_width > MAX_WINDOW_WIDTH {
            return Err(LayoutError::MaxWidthTooLarge(max_width));
        }
        Ok(Self { max_width, byte_offset_cursor })
    }
    /// Constructs a configuration covering every packed (non-raw) width of the bit rate table.
    pub fn for_bit_rates(table: &BitRateTable, byte_offset_cursor: ByteOffsetCursor) -> LayoutResult<Self> {
        Self::new(table.max_packed_width(), byte_offset_cursor)
    }
    /// Returns the maximum field width.
    pub fn max_width(&self) -> u8 { self.max_width }
    /// Returns the byte offset cursor policy.
    pub fn byte_offset_cursor(&self) -> ByteOffsetCursor { self.byte_offset_cursor }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { max_width: DEFAULT_MAX_WIDTH, byte_offset_cursor: ByteOffsetCursor::default() }
    }
}

/// Which table an address mismatch was found in.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum AddressKind {
    /// Bit shift.
    Shift,
    /// Byte offset.
    ByteOffset,
}

/// A table cell that disagrees with direct cursor arithmetic.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct AddressMismatch {
    /// Table the cell belongs to.
    pub kind:      AddressKind,
    /// Starting bit phase.
    pub phase:     u8,
    /// Field width.
    pub width:     u8,
    /// Component index (0-2).
    pub component: usize,
    /// Value computed from the simulated cursor.
    pub expected:  i32,
    /// Value stored in the table.
    pub actual:    i32,
}

impl fmt::Display for AddressMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self.kind {
                AddressKind::Shift      => "shift",
                AddressKind::ByteOffset => "byte offset",
            };
        write!(f, "{} [phase {}][width {}][component {}]: expected {}, table has {}",
               name, self.phase, self.width, self.component, self.expected, self.actual)
    }
}

/// Shift table `[8][max_width + 1][3]`.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct ShiftTable {
    max_width: u8,
    values:    Vec<[u8; NUM_COMPONENTS]>,
}

impl ShiftTable {
    /// Generates shifts for every phase and every width up to and including the maximum width.
    ///
    /// The first component is read at the phase itself, the cursor advances by the width before each following one.
    pub fn generate(cfg: &LayoutConfig) -> Self {
        let num_widths = usize::from(cfg.max_width) + 1;
        let mut values = Vec::with_capacity(NUM_PHASES * num_widths);
        for phase in 0..NUM_PHASES as u32 {
            for width in 0..=cfg.max_width {
                let bit_shift = 32 - i32::from(width);
                let mut cursor = phase;
                let mut cell = [0u8; NUM_COMPONENTS];
                for (i, el) in cell.iter_mut().enumerate() {
                    if i > 0 {
                        cursor += u32::from(width);
                    }
                    *el = (bit_shift - (cursor % 8) as i32) as u8;
                }
                values.push(cell);
            }
        }
        debug!(max_width = cfg.max_width, cells = values.len(), "generated shift table");
        Self { max_width: cfg.max_width, values }
    }
    /// Returns the maximum field width covered.
    pub fn max_width(&self) -> u8 { self.max_width }
    /// Returns the number of width columns per phase.
    pub fn num_widths(&self) -> usize { usize::from(self.max_width) + 1 }
    /// Returns the shifts for three components starting at `phase` with the given width.
    pub fn get(&self, phase: u8, width: u8) -> Option<[u8; NUM_COMPONENTS]> {
        if usize::from(phase) >= NUM_PHASES || width > self.max_width {
            return None;
        }
        Some(self.values[usize::from(phase) * self.num_widths() + usize::from(width)])
    }
    /// Iterates over table rows, one per phase.
    pub fn rows(&self) -> std::slice::Chunks<[u8; NUM_COMPONENTS]> {
        self.values.chunks(self.num_widths())
    }
    /// Lists every cell that disagrees with direct cursor arithmetic.
    pub fn mismatches(&self) -> Vec<AddressMismatch> {
        let mut ret = Vec::new();
        for (phase, row) in self.rows().enumerate() {
            for (width, cell) in row.iter().enumerate() {
                let addrs = vec3_addresses(phase as u8, width as u8);
                for component in 0..NUM_COMPONENTS {
                    let expected = addrs[component].shift;
                    let actual = i32::from(cell[component]);
                    if expected != actual {
                        ret.push(AddressMismatch { kind: AddressKind::Shift, phase: phase as u8, width: width as u8, component, expected, actual });
                    }
                }
            }
        }
        ret
    }
}

/// Byte offset table `[8][max_width][2]` for the second and third components.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct ByteOffsetTable {
    max_width: u8,
    cursor:    ByteOffsetCursor,
    values:    Vec<[u8; NUM_COMPONENTS - 1]>,
}

impl ByteOffsetTable {
    /// Generates byte offsets for every phase and every width below the maximum width.
    pub fn generate(cfg: &LayoutConfig) -> Self {
        let num_widths = usize::from(cfg.max_width);
        let mut values = Vec::with_capacity(NUM_PHASES * num_widths);
        for phase in 0..NUM_PHASES as u32 {
            let mut carried = phase;
            for width in 0..u32::from(cfg.max_width) {
                let mut cursor = match cfg.byte_offset_cursor {
                        ByteOffsetCursor::ZeroBased => 0,
                        ByteOffsetCursor::Carried   => carried,
                        ByteOffsetCursor::Phased    => phase,
                    };
                let mut cell = [0u8; NUM_COMPONENTS - 1];
                for el in cell.iter_mut() {
                    cursor += width;
                    *el = (cursor / 8) as u8;
                }
                carried = cursor;
                values.push(cell);
            }
        }
        debug!(max_width = cfg.max_width, cursor = %cfg.byte_offset_cursor, cells = values.len(), "generated byte offset table");
        Self { max_width: cfg.max_width, cursor: cfg.byte_offset_cursor, values }
    }
    /// Returns the number of width columns per phase.
    pub fn num_widths(&self) -> usize { usize::from(self.max_width) }
    /// Returns the cursor policy the table was generated with.
    pub fn cursor(&self) -> ByteOffsetCursor { self.cursor }
    /// Returns the byte offsets of the second and third components.
    pub fn get(&self, phase: u8, width: u8) -> Option<[u8; NUM_COMPONENTS - 1]> {
        if usize::from(phase) >= NUM_PHASES || width >= self.max_width {
            return None;
        }
        Some(self.values[usize::from(phase) * self.num_widths() + usize::from(width)])
    }
    /// Iterates over table rows, one per phase.
    pub fn rows(&self) -> std::slice::Chunks<[u8; NUM_COMPONENTS - 1]> {
        // chunks() panics on zero size
        self.values.chunks(self.num_widths().max(1))
    }
    /// Lists every cell that disagrees with direct cursor arithmetic.
    ///
    /// Only [`ByteOffsetCursor::Phased`] tables are free of mismatches;
    /// the other policies report the cells where the phase would have moved a component into the next byte.
    ///
    /// [`ByteOffsetCursor::Phased`]: ./enum.ByteOffsetCursor.html#variant.Phased
    pub fn mismatches(&self) -> Vec<AddressMismatch> {
        let mut ret = Vec::new();
        if self.values.is_empty() {
            return ret;
        }
        for (phase, row) in self.rows().enumerate() {
            for (width, cell) in row.iter().enumerate() {
                let addrs = vec3_addresses(phase as u8, width as u8);
                for component in 1..NUM_COMPONENTS {
                    let expected = addrs[component].byte_offset as i32;
                    let actual = i32::from(cell[component - 1]);
                    if expected != actual {
                        ret.push(AddressMismatch { kind: AddressKind::ByteOffset, phase: phase as u8, width: width as u8, component, expected, actual });
                    }
                }
            }
        }
        ret
    }
}

/// Reads a packed three component sample the way a table-driven decoder does.
///
/// The base byte is `bit_cursor / 8`, the first component uses no extra offset and the other two add
/// the byte offset table entry for the cursor phase.
pub fn decode_vec3(src: &[u8], bit_cursor: u32, width: u8, shifts: &ShiftTable, offsets: &ByteOffsetTable) -> BitReaderResult<[u32; NUM_COMPONENTS]> {
    let base = bit_cursor / 8;
    let phase = (bit_cursor % 8) as u8;
    let shift = shifts.get(phase, width).ok_or(BitReaderError::InvalidValue)?;
    let offset = offsets.get(phase, width).ok_or(BitReaderError::InvalidValue)?;
    let mut ret = [0; NUM_COMPONENTS];
    for (i, el) in ret.iter_mut().enumerate() {
        let byte_offset = if i == 0 { base } else { base + u32::from(offset[i - 1]) };
        *el = read_window(src, byte_offset, i32::from(shift[i]), width)?;
    }
    Ok(ret)
}
