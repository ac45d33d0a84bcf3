//! Bitstream reader for packed track samples.
//!
//! Two ways of reading are provided: sequential reading with [`BitReader`] which is used as the reference,
//! and [`read_window`] which mimics the decoder fast path that loads a big-endian 32-bit window
//! at some byte offset and extracts a field with a precomputed shift.
//!
//! # Examples
//!
//! ```
//! use bitlayout_core::io::bitreader::{BitReader, read_window};
//!
//! # use bitlayout_core::io::bitreader::BitReaderResult;
//! # fn foo() -> BitReaderResult<u32> {
//! let bits: [u8; 4] = [ 42, 43, 44, 45 ];
//! let mut br = BitReader::new(&bits);
//! br.skip(3)?;
//! let value = br.read(11)?;
//! // the same field: 3 bits into byte 0, shift = 32 - 11 - 3
//! assert_eq!(read_window(&bits, 0, 18, 11)?, value);
//! # Ok(value)
//! # }
//! ```
//!
//! [`BitReader`]: ./struct.BitReader.html
//! [`read_window`]: ./fn.read_window.html
use thiserror::Error;

/// A list specifying general bitstream reading errors.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Error)]
pub enum BitReaderError {
    /// The reader is at the end of bitstream.
    #[error("unexpected end of bitstream")]
    BitstreamEnd,
    /// The caller tried to read too many bits at once.
    #[error("too many bits requested")]
    TooManyBitsRequested,
    /// Some argument is invalid.
    #[error("invalid value")]
    InvalidValue,
}

use self::BitReaderError::*;

/// A specialised `Result` type for bitstream operations.
pub type BitReaderResult<T> = Result<T, BitReaderError>;

/// Big-endian bitstream reader.
#[derive(Debug,Clone)]
pub struct BitReader<'a> {
    cache: u64,
    bits:  u8,
    pos:   usize,
    src:   &'a [u8],
}

impl<'a> BitReader<'a> {
    /// Constructs a new instance of bitstream reader.
    pub fn new(src: &'a [u8]) -> Self {
        BitReader{ cache: 0, pos: 0, bits: 0, src }
    }

    /// Reports the current bit position in the bitstream.
    pub fn tell(&self) -> usize {
        self.pos * 8 - (self.bits as usize)
    }

    /// Reports the amount of bits left until the end of the bitstream.
    pub fn left(&self) -> isize {
        ((self.src.len() as isize) - (self.pos as isize)) * 8 + (self.bits as isize)
    }

    fn refill(&mut self) -> BitReaderResult<()> {
        if self.pos >= self.src.len() { return Err(BitstreamEnd) }
        while self.bits <= 56 && self.pos < self.src.len() {
            self.cache |= u64::from(self.src[self.pos]) << (56 - self.bits);
            self.pos  += 1;
            self.bits += 8;
        }
        Ok(())
    }

    /// Reads the specified amount of bits as an unsigned value.
    ///
    /// The amount should fit into 32 bits.
    pub fn read(&mut self, nbits: u8) -> BitReaderResult<u32> {
        if nbits == 0 { return Ok(0) }
        if nbits > 32 { return Err(TooManyBitsRequested) }
        if self.bits < nbits {
            self.refill()?;
            if self.bits < nbits { return Err(BitstreamEnd) }
        }
        let res = (self.cache >> (64 - nbits)) as u32;
        self.cache <<= nbits;
        self.bits -= nbits;
        Ok(res)
    }

    /// Reads three components of the same width.
    pub fn read_vec3(&mut self, nbits: u8) -> BitReaderResult<[u32; 3]> {
        Ok([self.read(nbits)?, self.read(nbits)?, self.read(nbits)?])
    }

    /// Skips the requested amount of bits.
    pub fn skip(&mut self, nbits: u32) -> BitReaderResult<()> {
        let mut left = nbits;
        while left > 0 {
            let step = left.min(32) as u8;
            self.read(step)?;
            left -= u32::from(step);
        }
        Ok(())
    }

    /// Seeks to the absolute bit position in the stream.
    /// If the requested position lies after the bitstream end the function returns [`TooManyBitsRequested`].
    ///
    /// [`TooManyBitsRequested`]: ./enum.BitReaderError.html#variant.TooManyBitsRequested
    pub fn seek(&mut self, nbits: u32) -> BitReaderResult<()> {
        if ((nbits + 7) >> 3) as usize > self.src.len() { return Err(TooManyBitsRequested); }
        self.bits  = 0;
        self.cache = 0;
        self.pos   = (nbits / 8) as usize;
        self.skip(nbits & 7)
    }
}

/// Loads a big-endian 32-bit word starting at `byte_offset`.
///
/// Bytes past the end of `src` read as zeroes.
pub fn load_be32(src: &[u8], byte_offset: usize) -> u32 {
    let mut word = 0u32;
    for i in 0..4 {
        let byte = src.get(byte_offset + i).copied().unwrap_or(0);
        word = (word << 8) | u32::from(byte);
    }
    word
}

/// Extracts a `width` bit field from the 32-bit window at `byte_offset` shifted right by `shift`.
///
/// This is how a decoder reads packed components with the address tables.
/// The field itself must lie inside `src`, padding after it is not required.
pub fn read_window(src: &[u8], byte_offset: u32, shift: i32, width: u8) -> BitReaderResult<u32> {
    if width > 32 { return Err(TooManyBitsRequested) }
    if shift < 0 || shift > 32 || i32::from(width) + shift > 32 { return Err(InvalidValue) }
    let field_end = u64::from(byte_offset) * 8 + (32 - shift) as u64;
    if width > 0 && field_end > (src.len() as u64) * 8 { return Err(BitstreamEnd) }
    let window = u64::from(load_be32(src, byte_offset as usize));
    let mask = (1u64 << width) - 1;
    Ok(((window >> shift) & mask) as u32)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn br_works() {
        const DATA: [u8; 18] = [0b00011011; 18];
        let mut br = BitReader::new(&DATA);
        for _ in 0..9 {
            assert_eq!(br.read(16).unwrap(), 0x1B1B);
        }
        assert_eq!(br.left(), 0);
        assert_eq!(br.read(1), Err(BitstreamEnd));

        let mut br = BitReader::new(&DATA);
        br.seek(3).unwrap();
        assert_eq!(br.tell(), 3);
        assert_eq!(br.read(5).unwrap(), 0b11011);
        assert_eq!(br.read_vec3(4).unwrap(), [0b0001, 0b1011, 0b0001]);
        assert_eq!(br.seek(18 * 8 + 1), Err(TooManyBitsRequested));
        assert_eq!(br.read(33), Err(TooManyBitsRequested));
    }
    #[test]
    fn window_works() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A];
        assert_eq!(load_be32(&data, 0), 0x12345678);
        assert_eq!(load_be32(&data, 3), 0x789A0000);
        assert_eq!(read_window(&data, 0, 0, 32).unwrap(), 0x12345678);
        assert_eq!(read_window(&data, 1, 24, 8).unwrap(), 0x34);
        assert_eq!(read_window(&data, 4, 24, 8).unwrap(), 0x9A);
        assert_eq!(read_window(&data, 4, 23, 8), Err(BitstreamEnd));
        assert_eq!(read_window(&data, 9, 32, 0).unwrap(), 0);
        assert_eq!(read_window(&data, 0, -1, 8), Err(InvalidValue));
        assert_eq!(read_window(&data, 0, 30, 8), Err(InvalidValue));
    }
}
