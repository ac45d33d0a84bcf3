//! Bitstream writer for packed track samples.
//!
//! Samples are packed most significant bit first into a `Vec<u8>`, which is the layout the address tables describe.
//!
//! # Examples
//!
//! Packing a three component sample with 11 bits per component:
//! ```
//! use bitlayout_core::io::bitwriter::BitWriter;
//!
//! let mut bw = BitWriter::new(Vec::new());
//! bw.write_vec3([1, 2, 3], 11);
//! assert_eq!(bw.tell(), 33);
//! let data = bw.end();
//! assert_eq!(data.len(), 5);
//! ```

/// Big-endian bitstream writer.
pub struct BitWriter {
    dst:    Vec<u8>,
    bitbuf: u32,
    bits:   u8,
    start:  usize,
}

impl BitWriter {
    /// Creates a new instance of `BitWriter` that will append data to the input vector.
    pub fn new(dst: Vec<u8>) -> Self {
        let start = dst.len();
        Self {
            dst,
            start,
            bitbuf: 0,
            bits:   0,
        }
    }
    /// Writes single bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.bitbuf |= (bit as u32) << (31 - self.bits);
        self.bits += 1;
        self.flush();
    }
    /// Writes `bits` low bits of `val` to the output.
    ///
    /// Higher bits of `val` are ignored.
    pub fn write(&mut self, val: u32, bits: u8) {
        if bits == 0 {
            return;
        }
        let val = if bits < 32 { val & ((1 << bits) - 1) } else { val };
        if self.bits + bits <= 32 {
            self.bitbuf |= val << (32 - self.bits - bits);
            self.bits += bits;
            self.flush();
        } else {
            let cbits = 32 - self.bits;
            let bits2 = bits - cbits;
            self.write(val >> bits2, cbits);
            self.write(val & ((1 << bits2) - 1), bits2);
        }
    }
    /// Writes three components of the same width back to back.
    pub fn write_vec3(&mut self, vals: [u32; 3], bits: u8) {
        for &val in vals.iter() {
            self.write(val, bits);
        }
    }
    /// Writes zero bits until the stream position reaches `pos` bits.
    ///
    /// Does nothing if the writer is already past that position.
    pub fn pad_to(&mut self, pos: usize) {
        while self.tell() < pos {
            self.write_bit(false);
        }
    }
    /// Tells the amount of bits written so far.
    pub fn tell(&self) -> usize {
        (self.dst.len() - self.start) * 8 + (self.bits as usize)
    }
    fn flush(&mut self) {
        while self.bits >= 8 {
            self.dst.push((self.bitbuf >> 24) as u8);
            self.bitbuf <<= 8;
            self.bits    -= 8;
        }
    }
    /// Finalises operations and returns the vector containing output data.
    ///
    /// The last partial byte is padded with zeroes.
    pub fn end(mut self) -> Vec<u8> {
        self.flush();
        if self.bits > 0 {
            self.dst.push((self.bitbuf >> 24) as u8);
        }
        self.dst
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bw_works() {
        let mut bw = BitWriter::new(Vec::new());
        bw.write(43, 9);
        let data = bw.end();
        assert_eq!(&data, &[21, 128]);

        let mut bw = BitWriter::new(vec![0xAA]);
        bw.write_bit(true);
        bw.write(0xFFFF_FFFF, 32);
        assert_eq!(bw.tell(), 33);
        let data = bw.end();
        assert_eq!(&data, &[0xAA, 0xFF, 0xFF, 0xFF, 0xFF, 0x80]);
    }
    #[test]
    fn bw_masks_and_pads() {
        let mut bw = BitWriter::new(Vec::new());
        bw.write(0xFF, 3);
        bw.pad_to(8);
        bw.write_vec3([1, 0, 1], 4);
        bw.pad_to(4);
        let data = bw.end();
        assert_eq!(&data, &[0b1110_0000, 0b0001_0000, 0b0001_0000]);
    }
}
