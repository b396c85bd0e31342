use crate::error::{Error, Result};

/// Dense 8-bit raster, row-major, origin top-left
///
/// Holds either a single luminance channel or interleaved RGB samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap raw samples, checking dimensions, channel count and buffer length
    pub fn from_vec(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height, channels)?;
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(Error::InvalidInput(format!(
                "buffer holds {} samples, {}x{}x{} needs {}",
                data.len(),
                width,
                height,
                channels,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Single-channel raster from raw samples
    pub fn gray(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        Self::from_vec(width, height, 1, data)
    }

    /// Interleaved RGB raster from raw samples
    pub fn rgb(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        Self::from_vec(width, height, 3, data)
    }

    /// Raster with every sample set to `value`
    pub fn filled(width: usize, height: usize, channels: usize, value: u8) -> Result<Self> {
        check_dimensions(width, height, channels)?;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![value; width * height * channels],
        })
    }

    /// Get raster width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get raster height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples per pixel (1 or 3)
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of pixels (not samples)
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Get raw samples
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the raster and return its samples
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Sample at (x, y) of a single-channel raster, `None` out of bounds
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height || self.channels != 1 {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// All channels of the pixel at (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.channels;
        Some(&self.data[start..start + self.channels])
    }

    /// Samples of row `y`
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.width * self.channels;
        Some(&self.data[y * stride..(y + 1) * stride])
    }

    /// Fail with `InvalidInput` unless the raster has `channels` samples per pixel
    pub fn expect_channels(&self, channels: usize) -> Result<()> {
        if self.channels != channels {
            return Err(Error::InvalidInput(format!(
                "expected {} channel(s), got {}",
                channels, self.channels
            )));
        }
        Ok(())
    }
}

fn check_dimensions(width: usize, height: usize, channels: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidInput(format!(
            "raster dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    if channels != 1 && channels != 3 {
        return Err(Error::InvalidInput(format!(
            "unsupported channel count {}",
            channels
        )));
    }
    Ok(())
}
