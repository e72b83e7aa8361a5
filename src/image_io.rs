//! C9 (image half): thresholds a greyscale source image into a packed
//! 1-bit raster, and reconstructs an image file from one. Image
//! decoding/encoding itself is delegated to the `image` crate; thresholding
//! and bit-packing are local, matching the reference implementation's
//! `read_1bit_image`/`binary_to_1bit_image` except for the threshold
//! itself: the reference computes an Otsu threshold per image, this fixes
//! it at the midpoint of the luminance range (see DESIGN.md's Open
//! Question decision).
use image::{GenericImageView, ImageBuffer, Luma};

use crate::bits;
use crate::errors::{DmrError, Result};

/// Luminance at or above this value (0-255) is treated as a set bit.
pub const THRESHOLD: u8 = 128;

/// Load `path` as greyscale, threshold it, and return the packed 1-bit
/// raster (row-major, MSB-first) alongside its `(width, height)`.
pub fn read_thresholded(path: &str) -> Result<(Vec<u8>, u32, u32)> {
    let img = image::open(path).map_err(|e| DmrError::RsCodecError(format!("image read error: {e}")))?;
    let (width, height) = img.dimensions();
    let grey = img.to_luma8();

    let mut bit_vec = Vec::with_capacity((width * height) as usize);
    for pixel in grey.pixels() {
        bit_vec.push(pixel.0[0] >= THRESHOLD);
    }

    Ok((bits::pack_bits(&bit_vec), width, height))
}

/// Reconstruct a greyscale image file from a packed 1-bit raster and its
/// `(width, height)`, writing pure black/white pixels, and save it to
/// `path`.
pub fn write_thresholded(path: &str, packed: &[u8], width: u32, height: u32) -> Result<()> {
    let bit_len = (width * height) as usize;
    let bit_vec = bits::unpack_bits(packed, bit_len);

    let mut out = ImageBuffer::<Luma<u8>, Vec<u8>>::new(width, height);
    for (i, pixel) in out.pixels_mut().enumerate() {
        let value = if bit_vec.get(i).copied().unwrap_or(false) { 255 } else { 0 };
        *pixel = Luma([value]);
    }

    out.save(path)
        .map_err(|e| DmrError::RsCodecError(format!("image write error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_round_trip_preserves_dimensions_and_bit_count() {
        let dir = std::env::temp_dir();
        let src_path = dir.join("dmr_codec_test_source.png");
        let dst_path = dir.join("dmr_codec_test_roundtrip.png");

        let mut img = ImageBuffer::<Luma<u8>, Vec<u8>>::new(4, 2);
        for (i, pixel) in img.pixels_mut().enumerate() {
            *pixel = Luma([if i % 2 == 0 { 0 } else { 255 }]);
        }
        img.save(&src_path).unwrap();

        let (packed, width, height) = read_thresholded(src_path.to_str().unwrap()).unwrap();
        assert_eq!((width, height), (4, 2));
        assert_eq!(packed.len(), 1); // ceil(4*2/8) == 1

        write_thresholded(dst_path.to_str().unwrap(), &packed, width, height).unwrap();
        let (roundtripped, w2, h2) = read_thresholded(dst_path.to_str().unwrap()).unwrap();
        assert_eq!((w2, h2), (width, height));
        assert_eq!(roundtripped, packed);

        let _ = std::fs::remove_file(&src_path);
        let _ = std::fs::remove_file(&dst_path);
    }
}
