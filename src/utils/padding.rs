//! Reflect padding
//!
//! Borders are mirrored about the edge sample without repeating it:
//! index -1 reads index 1, index `len` reads `len - 2`. Offsets deeper than
//! the image bounce back and forth, so the addressing is periodic with
//! period `2 * (len - 1)`.
//!
//! ```text
//! [10, 20, 30, 40], half = 2  ->  [30, 20 | 10, 20, 30, 40 | 30, 20]
//! ```

use crate::error::{Error, Result};
use crate::models::Raster;

/// Map a possibly out-of-range coordinate onto `0..len` by reflection
///
/// `len` must be positive. A length of 1 has nothing to mirror and always
/// maps to 0.
#[inline]
pub fn reflect_index(i: isize, len: usize) -> usize {
    debug_assert!(len > 0);
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let m = i.rem_euclid(period);
    if m < len as isize {
        m as usize
    } else {
        (period - m) as usize
    }
}

/// Pad a single row, mainly useful for checking the border law
pub fn reflect_pad_row(row: &[u8], half: usize) -> Vec<u8> {
    if row.is_empty() {
        return Vec::new();
    }
    let half = half as isize;
    (-half..row.len() as isize + half)
        .map(|i| row[reflect_index(i, row.len())])
        .collect()
}

/// Luminance raster extended by `half` mirrored samples on every side
#[derive(Debug, Clone)]
pub struct PaddedRaster {
    width: usize,
    height: usize,
    half: usize,
    data: Vec<u8>,
}

impl PaddedRaster {
    /// Padded width (`source width + 2 * half`)
    pub fn width(&self) -> usize {
        self.width
    }

    /// Padded height (`source height + 2 * half`)
    pub fn height(&self) -> usize {
        self.height
    }

    /// Padding depth on each side
    pub fn half(&self) -> usize {
        self.half
    }

    /// Width of the raster this was padded from
    pub fn source_width(&self) -> usize {
        self.width - 2 * self.half
    }

    /// Height of the raster this was padded from
    pub fn source_height(&self) -> usize {
        self.height - 2 * self.half
    }

    /// Sample at padded coordinates (x, y)
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Samples of padded row `y`
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Get raw samples
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Build the reflect-padded extension of a luminance raster
///
/// Fails with `InvalidParameter` when `half > 0` and the raster has a
/// dimension of length 1, since there is no interior sample to mirror, or
/// when the padded size does not fit in `usize`.
pub fn reflect_pad(gray: &Raster, half: usize) -> Result<PaddedRaster> {
    gray.expect_channels(1)?;
    let (width, height) = (gray.width(), gray.height());
    if half > 0 && (width < 2 || height < 2) {
        return Err(Error::InvalidParameter(format!(
            "cannot reflect-pad a {}x{} image by {}: each side needs at least 2 pixels",
            width, height, half
        )));
    }

    let (padded_width, padded_height) = half
        .checked_mul(2)
        .and_then(|pad| width.checked_add(pad).zip(height.checked_add(pad)))
        .filter(|(w, h)| w.checked_mul(*h).is_some())
        .ok_or_else(|| {
            Error::InvalidParameter(format!(
                "padding a {}x{} image by {} overflows",
                width, height, half
            ))
        })?;
    let src = gray.as_bytes();

    // Column lookup shared by every row
    let cols: Vec<usize> = (0..padded_width)
        .map(|px| reflect_index(px as isize - half as isize, width))
        .collect();

    let mut data = Vec::with_capacity(padded_width * padded_height);
    for py in 0..padded_height {
        let sy = reflect_index(py as isize - half as isize, height);
        let src_row = &src[sy * width..(sy + 1) * width];
        data.extend(cols.iter().map(|&sx| src_row[sx]));
    }

    Ok(PaddedRaster {
        width: padded_width,
        height: padded_height,
        half,
        data,
    })
}
