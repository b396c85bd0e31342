//! Convert RGB rasters to single-channel luminance
//! Y = trunc(0.299*R + 0.587*G + 0.114*B)
//!
//! The weighted sum is evaluated in f64 in exactly that order and then cast
//! to an integer, so the fractional part is dropped rather than rounded.
//! Some neutral inputs therefore land one level low (1,1,1 gives 0.9999...,
//! stored as 0); downstream thresholds depend on that behaviour, so it is
//! kept bit-for-bit.

use crate::error::{Error, Result};
use crate::models::Raster;
use rayon::prelude::*;

/// Luminance weight of the red channel
pub const WEIGHT_R: f64 = 0.299;
/// Luminance weight of the green channel
pub const WEIGHT_G: f64 = 0.587;
/// Luminance weight of the blue channel
pub const WEIGHT_B: f64 = 0.114;

/// Luminance of one RGB triple
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let lum = WEIGHT_R * r as f64 + WEIGHT_G * g as f64 + WEIGHT_B * b as f64;
    // Weights sum to 1.0, the cast only truncates
    lum as u8
}

/// Reduce an RGB raster to a luminance raster
pub fn to_grayscale(rgb: &Raster) -> Result<Raster> {
    rgb.expect_channels(3)?;
    let gray = rgb_to_grayscale(rgb.as_bytes(), rgb.width(), rgb.height())?;
    Raster::gray(rgb.width(), rgb.height(), gray)
}

/// Reduce an RGB raster to luminance, processing rows in parallel
pub fn to_grayscale_parallel(rgb: &Raster) -> Result<Raster> {
    rgb.expect_channels(3)?;
    let gray = rgb_to_grayscale_parallel(rgb.as_bytes(), rgb.width(), rgb.height())?;
    Raster::gray(rgb.width(), rgb.height(), gray)
}

/// Convert interleaved RGB bytes to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let mut gray = vec![0u8; width * height];
    rgb_to_grayscale_with_buffer(rgb, width, height, &mut gray)?;
    Ok(gray)
}

/// Convert RGB to grayscale using parallel processing
/// Processes rows in parallel for multi-core speedup
pub fn rgb_to_grayscale_parallel(rgb: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    check_rgb_len(rgb, width, height)?;
    let mut gray = vec![0u8; width * height];

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let src = &rgb[y * width * 3..(y + 1) * width * 3];
        convert_row(src, row);
    });

    Ok(gray)
}

/// Convert RGB to grayscale into a pre-allocated buffer (no allocation)
///
/// # Arguments
/// * `rgb` - Input RGB image data
/// * `width` - Image width
/// * `height` - Image height
/// * `output` - Output buffer, at least `width * height` long
///
/// # Returns
/// Number of pixels written (width * height)
pub fn rgb_to_grayscale_with_buffer(
    rgb: &[u8],
    width: usize,
    height: usize,
    output: &mut [u8],
) -> Result<usize> {
    check_rgb_len(rgb, width, height)?;
    let pixel_count = width * height;
    if output.len() < pixel_count {
        return Err(Error::InvalidInput(format!(
            "output buffer holds {} pixels, need {}",
            output.len(),
            pixel_count
        )));
    }

    convert_row(rgb, &mut output[..pixel_count]);
    Ok(pixel_count)
}

fn convert_row(rgb: &[u8], gray: &mut [u8]) {
    for (dst, px) in gray.iter_mut().zip(rgb.chunks_exact(3)) {
        *dst = luminance(px[0], px[1], px[2]);
    }
}

fn check_rgb_len(rgb: &[u8], width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidInput(format!(
            "image dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    if rgb.len() != width * height * 3 {
        return Err(Error::InvalidInput(format!(
            "RGB buffer holds {} bytes, {}x{} needs {}",
            rgb.len(),
            width,
            height,
            width * height * 3
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_grayscale() {
        // Pure white
        let gray = rgb_to_grayscale(&[255, 255, 255], 1, 1).unwrap();
        assert_eq!(gray[0], 255);

        // Pure black
        let gray = rgb_to_grayscale(&[0, 0, 0], 1, 1).unwrap();
        assert_eq!(gray[0], 0);

        // 140.75 truncates to 140
        let gray = rgb_to_grayscale(&[100, 150, 200], 1, 1).unwrap();
        assert_eq!(gray[0], 140);

        // Pure red: 76.245
        let gray = rgb_to_grayscale(&[255, 0, 0], 1, 1).unwrap();
        assert_eq!(gray[0], 76);

        // 2x2 image
        let img = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let gray = rgb_to_grayscale(&img, 2, 2).unwrap();
        assert_eq!(gray, vec![76, 149, 29, 255]);
    }

    #[test]
    fn test_truncation_not_rounding() {
        // 0.299 + 0.587 + 0.114 sums to just under 1.0 in f64
        assert_eq!(luminance(1, 1, 1), 0);
        // 0.587 * 255 = 149.685 would round to 150
        assert_eq!(luminance(0, 255, 0), 149);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (width, height) = (17, 9);
        let rgb: Vec<u8> = (0..width * height * 3).map(|i| (i * 37 % 256) as u8).collect();
        let seq = rgb_to_grayscale(&rgb, width, height).unwrap();
        let par = rgb_to_grayscale_parallel(&rgb, width, height).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_with_buffer() {
        let mut out = vec![7u8; 4];
        let written = rgb_to_grayscale_with_buffer(&[100, 150, 200], 1, 1, &mut out).unwrap();
        assert_eq!(written, 1);
        assert_eq!(out, vec![140, 7, 7, 7]);

        let mut small = vec![0u8; 1];
        assert!(rgb_to_grayscale_with_buffer(&[0u8; 6], 2, 1, &mut small).is_err());
    }

    #[test]
    fn test_rejects_wrong_channels() {
        let gray = Raster::gray(2, 2, vec![0; 4]).unwrap();
        assert!(matches!(to_grayscale(&gray), Err(Error::InvalidInput(_))));
        assert!(matches!(
            rgb_to_grayscale(&[0u8; 5], 1, 2),
            Err(Error::InvalidInput(_))
        ));
    }
}
