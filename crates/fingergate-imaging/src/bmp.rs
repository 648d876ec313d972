use crate::error::{ImagingError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{DateTime, Local};
use fingergate_core::constants::{PALETTE_ENTRIES, SENSOR_DPI};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_HEADER_SIZE: usize = 14;
const INFO_HEADER_SIZE: usize = 40;
const PALETTE_SIZE: usize = PALETTE_ENTRIES * 4;

/// Offset of the first pixel byte.
pub const PIXEL_OFFSET: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE + PALETTE_SIZE;

/// 500 DPI expressed in pixels per metre, truncated.
const PIXELS_PER_METER: i32 = (SENSOR_DPI * 10_000 / 254) as i32;

const MAGIC: &[u8; 2] = b"BM";

/// One grayscale frame as delivered by the sensor.
///
/// `pixels` is row-major, one byte per pixel, first row first. The sensor may
/// report a buffer larger than `width * height`; only the leading
/// `width * height` bytes are image data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub reported_size: usize,
}

impl RawImage {
    /// Wrap a sensor buffer.
    ///
    /// # Errors
    /// `InvalidDimensions` for a zero or oversized side, `BufferTooSmall` if
    /// `pixels` cannot hold `width * height` bytes.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = pixel_count(width, height)?;
        if pixels.len() < expected {
            return Err(ImagingError::BufferTooSmall {
                expected,
                actual: pixels.len(),
            });
        }
        let reported_size = pixels.len();
        Ok(Self {
            width,
            height,
            pixels,
            reported_size,
        })
    }

    /// Number of image bytes, `width * height`.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row `y` counted from the top of the sensor.
    pub fn row(&self, y: u32) -> &[u8] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize> {
    let invalid = || ImagingError::InvalidDimensions { width, height };
    if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(invalid());
    }
    let count = (width as u64) * (height as u64);
    // bfSize is a 32-bit field.
    if count + PIXEL_OFFSET as u64 > u32::MAX as u64 {
        return Err(invalid());
    }
    Ok(count as usize)
}

/// An encoded image container and the name it should be stored under.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Bytes,
    pub file_name: String,
}

impl EncodedImage {
    /// Write the container into `dir` under its file name.
    ///
    /// # Errors
    /// `ImagingError::Write` if the file cannot be created or written.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes).map_err(|source| ImagingError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = self.bytes.len(), "wrote image");
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Timestamped file name, `finger_YYYYMMDD_HHMMSS.bmp`.
///
/// Unique only to the second.
pub fn file_name(now: DateTime<Local>) -> String {
    now.format("finger_%Y%m%d_%H%M%S.bmp").to_string()
}

/// Encode `image` and name it after the current local time.
pub fn encode(image: &RawImage) -> Result<EncodedImage> {
    encode_at(image, Local::now())
}

/// Encode `image` and name it after `now`.
///
/// # Errors
/// Fails only when the image itself is inconsistent.
///
/// # Examples
///
/// ```
/// use fingergate_imaging::{RawImage, encode};
///
/// let image = RawImage::new(2, 2, vec![0, 10, 200, 255]).unwrap();
/// let encoded = encode(&image).unwrap();
///
/// assert_eq!(encoded.len(), 1078 + 4);
/// assert_eq!(&encoded.bytes[..2], b"BM");
/// // last row first, inverted
/// assert_eq!(&encoded.bytes[1078..], &[55, 0, 255, 245]);
/// ```
pub fn encode_at(image: &RawImage, now: DateTime<Local>) -> Result<EncodedImage> {
    let count = pixel_count(image.width, image.height)?;
    if image.pixels.len() < count {
        return Err(ImagingError::BufferTooSmall {
            expected: count,
            actual: image.pixels.len(),
        });
    }
    let total = PIXEL_OFFSET + count;
    let mut buf = BytesMut::with_capacity(total);

    // File header
    buf.put_slice(MAGIC);
    buf.put_u32_le(total as u32);
    buf.put_u16_le(0);
    buf.put_u16_le(0);
    buf.put_u32_le(PIXEL_OFFSET as u32);

    // Info header
    buf.put_u32_le(INFO_HEADER_SIZE as u32);
    buf.put_i32_le(image.width as i32);
    buf.put_i32_le(image.height as i32);
    buf.put_u16_le(1);
    buf.put_u16_le(8);
    buf.put_u32_le(0); // compression
    buf.put_u32_le(0); // image size, may be 0 when uncompressed
    buf.put_i32_le(PIXELS_PER_METER);
    buf.put_i32_le(PIXELS_PER_METER);
    buf.put_u32_le(0);
    buf.put_u32_le(0);

    for i in 0..PALETTE_ENTRIES {
        let v = i as u8;
        buf.put_slice(&[v, v, v, 0]);
    }

    for y in (0..image.height).rev() {
        for &px in image.row(y) {
            buf.put_u8(255 - px);
        }
    }

    debug_assert_eq!(buf.len(), total);
    Ok(EncodedImage {
        bytes: buf.freeze(),
        file_name: file_name(now),
    })
}

/// Parse a container produced by [`encode`] back into sensor order.
///
/// # Errors
/// `ImagingError::Malformed` for anything other than an uncompressed,
/// bottom-up, 8-bit image with the expected header sizes and length.
pub fn decode(data: &[u8]) -> Result<RawImage> {
    if data.len() < PIXEL_OFFSET {
        return Err(ImagingError::malformed(format!(
            "{} bytes is shorter than the headers",
            data.len()
        )));
    }
    let mut cur = data;

    let mut magic = [0u8; 2];
    cur.copy_to_slice(&mut magic);
    if &magic != MAGIC {
        return Err(ImagingError::malformed("missing BM signature"));
    }
    let file_size = cur.get_u32_le() as usize;
    cur.advance(4);
    let offset = cur.get_u32_le() as usize;
    if file_size != data.len() {
        return Err(ImagingError::malformed(format!(
            "header says {file_size} bytes, got {}",
            data.len()
        )));
    }
    if offset != PIXEL_OFFSET {
        return Err(ImagingError::malformed(format!("pixel offset {offset}")));
    }

    let info_size = cur.get_u32_le() as usize;
    let width = cur.get_i32_le();
    let height = cur.get_i32_le();
    let planes = cur.get_u16_le();
    let bit_count = cur.get_u16_le();
    let compression = cur.get_u32_le();
    if info_size != INFO_HEADER_SIZE || planes != 1 {
        return Err(ImagingError::malformed("unexpected info header"));
    }
    if bit_count != 8 || compression != 0 {
        return Err(ImagingError::malformed(format!(
            "unsupported format: {bit_count} bpp, compression {compression}"
        )));
    }
    if width <= 0 || height <= 0 {
        return Err(ImagingError::malformed(format!(
            "unsupported dimensions {width}x{height}"
        )));
    }

    let (width, height) = (width as u32, height as u32);
    let count = pixel_count(width, height)?;
    let body = &data[PIXEL_OFFSET..];
    if body.len() != count {
        return Err(ImagingError::malformed(format!(
            "expected {count} pixel bytes, got {}",
            body.len()
        )));
    }

    let w = width as usize;
    let mut pixels = Vec::with_capacity(count);
    for row in body.chunks_exact(w).rev() {
        pixels.extend(row.iter().map(|px| 255 - px));
    }
    RawImage::new(width, height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rstest::rstest;

    fn le_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn gradient(width: u32, height: u32) -> RawImage {
        let pixels = (0..width * height).map(|i| (i % 256) as u8).collect();
        RawImage::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_pixel_offset_is_1078() {
        assert_eq!(PIXEL_OFFSET, 1078);
        assert_eq!(PIXELS_PER_METER, 19685);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(3, 5)]
    #[case(320, 480)]
    fn test_length_and_header_fields(#[case] width: u32, #[case] height: u32) {
        let encoded = encode(&gradient(width, height)).unwrap();
        let bytes = &encoded.bytes;
        let expected = 1078 + (width * height) as usize;

        assert_eq!(bytes.len(), expected);
        assert_eq!(le_u32(bytes, 2) as usize, expected);
        assert_eq!(le_u32(bytes, 10), 1078);
        assert_eq!(le_u32(bytes, 14), 40);
        assert_eq!(le_u32(bytes, 18), width);
        assert_eq!(le_u32(bytes, 22), height);
        assert_eq!(u16::from_le_bytes([bytes[26], bytes[27]]), 1);
        assert_eq!(u16::from_le_bytes([bytes[28], bytes[29]]), 8);
        assert_eq!(le_u32(bytes, 30), 0);
        assert_eq!(le_u32(bytes, 38), 19685);
        assert_eq!(le_u32(bytes, 42), 19685);
    }

    #[test]
    fn test_palette_is_grayscale_ramp() {
        let encoded = encode(&gradient(2, 2)).unwrap();
        let palette = &encoded.bytes[54..1078];
        for (i, entry) in palette.chunks_exact(4).enumerate() {
            assert_eq!(entry, &[i as u8, i as u8, i as u8, 0]);
        }
    }

    #[test]
    fn test_rows_flipped_and_inverted() {
        let image = RawImage::new(3, 2, vec![0, 1, 2, 100, 101, 102]).unwrap();
        let encoded = encode(&image).unwrap();
        assert_eq!(&encoded.bytes[1078..], &[155, 154, 153, 255, 254, 253]);
    }

    #[test]
    fn test_extra_sensor_bytes_are_ignored() {
        let image = RawImage::new(2, 1, vec![10, 20, 99, 99]).unwrap();
        assert_eq!(image.reported_size, 4);
        let encoded = encode(&image).unwrap();
        assert_eq!(encoded.len(), 1080);
        assert_eq!(&encoded.bytes[1078..], &[245, 235]);
    }

    #[rstest]
    #[case(0, 10)]
    #[case(10, 0)]
    #[case(u32::MAX, 1)]
    fn test_invalid_dimensions(#[case] width: u32, #[case] height: u32) {
        let result = RawImage::new(width, height, vec![]);
        assert!(matches!(result, Err(ImagingError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_buffer_too_small() {
        let result = RawImage::new(4, 4, vec![0; 15]);
        assert!(matches!(
            result,
            Err(ImagingError::BufferTooSmall { expected: 16, actual: 15 })
        ));
    }

    #[test]
    fn test_file_name_format() {
        let now = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(file_name(now), "finger_20240307_090502.bmp");
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let encoded = encode_at(&gradient(4, 4), now).unwrap();

        let path = encoded.write_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("finger_20241231_235959.bmp"));
        assert_eq!(fs::read(&path).unwrap(), encoded.bytes.as_ref());
    }

    #[test]
    fn test_write_to_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let encoded = encode(&gradient(1, 1)).unwrap();
        let result = encoded.write_to(&dir.path().join("nope"));
        assert!(matches!(result, Err(ImagingError::Write { .. })));
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let encoded = encode(&gradient(2, 2)).unwrap();
        let mut bytes = encoded.bytes.to_vec();
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(ImagingError::Malformed(_))));
    }

    #[test]
    fn test_decode_rejects_truncated() {
        let encoded = encode(&gradient(8, 8)).unwrap();
        let bytes = &encoded.bytes[..encoded.len() - 1];
        assert!(matches!(decode(bytes), Err(ImagingError::Malformed(_))));
        assert!(matches!(decode(&bytes[..100]), Err(ImagingError::Malformed(_))));
    }

    proptest! {
        #[test]
        fn prop_decode_restores_sensor_order(
            (width, height, pixels) in (1u32..24, 1u32..24).prop_flat_map(|(w, h)| {
                (Just(w), Just(h), proptest::collection::vec(any::<u8>(), (w * h) as usize))
            })
        ) {
            let image = RawImage::new(width, height, pixels).unwrap();
            let encoded = encode(&image).unwrap();
            prop_assert_eq!(encoded.len(), PIXEL_OFFSET + image.pixel_count());
            prop_assert_eq!(decode(&encoded.bytes).unwrap(), image);
        }
    }
}
