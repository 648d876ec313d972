//! Grayscale image container for captured fingerprints.
//!
//! Sensor frames are stored as 8-bit palettized BMP files before encryption.
//! The layout is fixed so the enrollment server can parse it without
//! negotiation:
//!
//! | Offset | Size | Content |
//! |-------:|-----:|---------|
//! | 0      | 14   | file header (`BM`, file size, pixel offset) |
//! | 14     | 40   | info header (width, height, 8 bpp, no compression, 500 DPI) |
//! | 54     | 1024 | grayscale palette, entry *i* = (i, i, i, 0) |
//! | 1078   | w×h  | pixel rows, last sensor row first, `255 - value` |
//!
//! Rows are not padded to four bytes.

pub mod bmp;
pub mod error;

pub use bmp::{EncodedImage, RawImage, decode, encode, encode_at, file_name};
pub use error::{ImagingError, Result};
