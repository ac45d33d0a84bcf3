//! Big-endian bitstream packing and reading used to check tables against real packed data.
pub mod bitreader;
pub mod bitwriter;
