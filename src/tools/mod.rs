use crate::error::{Error, Result};
use crate::models::Raster;
use crate::utils::binarization::FOREGROUND;
use crate::utils::statistics::global_stats;
use std::fs;
use std::path::{Path, PathBuf};

/// Load an image file as an RGB raster
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<Raster> {
    let img = image::open(path)?.to_rgb8();
    let (width, height) = img.dimensions();
    Raster::rgb(width as usize, height as usize, img.into_raw())
}

/// Save a single-channel raster; the format follows the file extension
pub fn save_gray<P: AsRef<Path>>(raster: &Raster, path: P) -> Result<()> {
    raster.expect_channels(1)?;
    let img = image::GrayImage::from_raw(
        raster.width() as u32,
        raster.height() as u32,
        raster.as_bytes().to_vec(),
    )
    .ok_or_else(|| Error::InvalidInput("raster does not fit an 8-bit gray image".into()))?;
    img.save(path)?;
    Ok(())
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Mean grayscale value.
    pub mean: f64,
    /// Population standard deviation (the global `S` of the threshold).
    pub std_dev: f64,
}

/// Summary statistics for a binarized raster.
#[derive(Debug, Clone, Copy)]
pub struct BinaryStats {
    /// Count of foreground (255) pixels.
    pub foreground: usize,
    /// Total pixels in the raster.
    pub total: usize,
    /// Ratio of foreground pixels to total pixels.
    pub foreground_ratio: f64,
}

/// Compute min/max/mean/deviation for a luminance raster.
pub fn grayscale_stats(gray: &Raster) -> GrayStats {
    let bytes = gray.as_bytes();
    let min = bytes.iter().copied().min().unwrap_or(0);
    let max = bytes.iter().copied().max().unwrap_or(0);
    let stats = global_stats(bytes);
    GrayStats {
        min,
        max,
        mean: stats.mean,
        std_dev: stats.std_dev,
    }
}

/// Compute foreground stats for a binarized raster.
pub fn binary_stats(binary: &Raster) -> BinaryStats {
    let foreground = binary
        .as_bytes()
        .iter()
        .filter(|&&v| v == FOREGROUND)
        .count();
    let total = binary.pixel_count();
    let ratio = if total == 0 {
        0.0
    } else {
        foreground as f64 / total as f64
    };
    BinaryStats {
        foreground,
        total,
        foreground_ratio: ratio,
    }
}

/// Output locations for one input: `<stem>_gray.bmp` and `<stem>_binary.bmp`
pub fn output_paths<P: AsRef<Path>, Q: AsRef<Path>>(input: P, out_dir: Q) -> (PathBuf, PathBuf) {
    let stem = input
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let out_dir = out_dir.as_ref();
    (
        out_dir.join(format!("{stem}_gray.bmp")),
        out_dir.join(format!("{stem}_binary.bmp")),
    )
}

/// Image files under `root` (recursive), sorted, optionally truncated
pub fn collect_images<P: AsRef<Path>>(root: P, limit: Option<usize>) -> Vec<PathBuf> {
    let mut stack = vec![root.as_ref().to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("skipping {}: {}", dir.display(), err);
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "gif") {
                    images.push(path);
                }
            }
        }
    }

    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images
}
