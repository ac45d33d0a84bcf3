//! Configuration errors for the table generators.
use thiserror::Error;

/// A list specifying invalid generator configurations.
///
/// Table generation itself is total; only the parameters describing a codec version can be wrong.
#[derive(Debug,Clone,PartialEq,Eq,Error)]
pub enum LayoutError {
    /// Bit rate table has fewer than two entries.
    #[error("bit rate table needs at least 2 entries, got {0}")]
    TooFewBitRates(usize),
    /// Bit rate table has so many entries that an index collides with the invalid bit rate.
    #[error("bit rate table has {0} entries, at most 255 are addressable")]
    TooManyBitRates(usize),
    /// Bit rate widths are not strictly increasing.
    #[error("bit rate widths must be strictly increasing (index {index}: {prev} then {next})")]
    UnorderedBitRates {
        /// Index of the offending entry.
        index: usize,
        /// Width before it.
        prev: u8,
        /// Offending width.
        next: u8,
    },
    /// Field width does not fit into a 32-bit value.
    #[error("bit rate width {0} exceeds 32 bits")]
    WidthTooLarge(u8),
    /// Field width cannot be read from a 32-bit window at every phase.
    #[error("maximum field width {0} does not fit a 32-bit read window at bit phase 7 (limit {})", crate::layout::MAX_WINDOW_WIDTH)]
    MaxWidthTooLarge(u8),
    /// Unknown preset name.
    #[error("unknown bit rate table preset '{0}'")]
    UnknownPreset(String),
    /// Unsupported number of degrees of freedom.
    #[error("unsupported DOF count {0}, expected 1, 2 or 3")]
    InvalidDofCount(u8),
    /// Unknown option value.
    #[error("invalid value '{0}'")]
    InvalidValue(String),
}

/// A specialised `Result` type for generator configuration.
pub type LayoutResult<T> = Result<T, LayoutError>;
