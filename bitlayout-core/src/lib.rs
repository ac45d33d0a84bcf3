//! Offline generators for packed track layout tables.
//!
//! This crate produces the lookup tables an animation codec compiles in: bit shifts and byte offsets
//! for reading three fields of the same width packed at an arbitrary bit phase, and the size-sorted
//! list of every per-channel bit rate combination used by the encoder rate search.
//! All generators take the bit rate table and layout parameters explicitly so any codec version can be regenerated.
pub mod bitrate;
pub mod emit;
pub mod error;
pub mod io;
#[allow(clippy::needless_range_loop)]
pub mod layout;
#[allow(clippy::needless_range_loop)]
pub mod permute;

pub use crate::bitrate::{BitRateTable, INVALID_BIT_RATE, LOWEST_BIT_RATE};
pub use crate::error::{LayoutError, LayoutResult};
pub use crate::layout::{AddressMismatch, ByteOffsetCursor, ByteOffsetTable, LayoutConfig, PackedFieldAddress, ShiftTable};
pub use crate::permute::{DofCount, PermutationEntry, PermutationTable, TrackHint};
