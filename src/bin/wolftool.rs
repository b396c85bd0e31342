use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use wolf_threshold::tools::{
    binary_stats, collect_images, grayscale_stats, load_rgb, output_paths, save_gray,
};
use wolf_threshold::{Error, Result, WindowStrategy, WolfConfig, binarize_with, to_grayscale};

#[derive(Parser)]
#[command(name = "wolftool", version, about = "Wolf adaptive binarization tools")]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
struct ThresholdArgs {
    /// Odd window size (default from WOLF_WINDOW_SIZE or 7)
    #[arg(long)]
    window: Option<usize>,
    /// Contrast weight k (default from WOLF_K or 0.3)
    #[arg(long)]
    k: Option<f64>,
    /// Recompute every window instead of using summed-area tables
    #[arg(long)]
    naive: bool,
    /// Force row parallelism on (otherwise chosen by image size)
    #[arg(long)]
    parallel: bool,
}

impl ThresholdArgs {
    fn config(&self, width: usize, height: usize) -> WolfConfig {
        let mut config = WolfConfig::from_env().for_image(width, height);
        if let Some(window) = self.window {
            config = config.with_window_size(window);
        }
        if let Some(k) = self.k {
            config = config.with_k(k);
        }
        if self.naive {
            config = config.with_strategy(WindowStrategy::Naive);
        }
        if self.parallel {
            config = config.with_parallel(true);
        }
        config
    }
}

#[derive(Subcommand)]
enum Command {
    /// Convert an image to grayscale
    Gray {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Binarize a single image
    Binarize {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Also write the intermediate grayscale image here
        #[arg(long)]
        gray_output: Option<PathBuf>,
        #[command(flatten)]
        threshold: ThresholdArgs,
    },
    /// Print grayscale and binary statistics for an image
    Stats {
        #[arg(long)]
        image: PathBuf,
        #[command(flatten)]
        threshold: ThresholdArgs,
    },
    /// Binarize every image under a directory
    Batch {
        #[arg(long)]
        root: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        threshold: ThresholdArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Command::Gray { image, output } => gray_cmd(&image, &output),
        Command::Binarize {
            image,
            output,
            gray_output,
            threshold,
        } => binarize_cmd(&image, &output, gray_output.as_deref(), &threshold),
        Command::Stats { image, threshold } => stats_cmd(&image, &threshold),
        Command::Batch {
            root,
            out_dir,
            limit,
            threshold,
        } => batch_cmd(&root, &out_dir, limit, &threshold),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn gray_cmd(image: &Path, output: &Path) -> Result<()> {
    let rgb = load_rgb(image)?;
    let gray = to_grayscale(&rgb)?;
    save_gray(&gray, output)?;
    log::info!(
        "{} ({}x{}) -> {}",
        image.display(),
        gray.width(),
        gray.height(),
        output.display()
    );
    Ok(())
}

fn binarize_cmd(
    image: &Path,
    output: &Path,
    gray_output: Option<&Path>,
    threshold: &ThresholdArgs,
) -> Result<()> {
    let rgb = load_rgb(image)?;
    let config = threshold.config(rgb.width(), rgb.height());
    config.validate(rgb.width(), rgb.height())?;

    let gray = to_grayscale(&rgb)?;
    if let Some(path) = gray_output {
        save_gray(&gray, path)?;
    }

    let start = Instant::now();
    let binary = binarize_with(&gray, &config)?;
    let elapsed = start.elapsed();
    save_gray(&binary, output)?;

    let stats = binary_stats(&binary);
    log::info!(
        "{} ({}x{}) -> {}: foreground {:.2}% in {:.1} ms",
        image.display(),
        binary.width(),
        binary.height(),
        output.display(),
        stats.foreground_ratio * 100.0,
        elapsed.as_secs_f64() * 1000.0
    );
    Ok(())
}

fn stats_cmd(image: &Path, threshold: &ThresholdArgs) -> Result<()> {
    let rgb = load_rgb(image)?;
    let gray = to_grayscale(&rgb)?;
    let config = threshold.config(gray.width(), gray.height());

    println!("Image: {} ({}x{})", image.display(), gray.width(), gray.height());
    let gray_stats = grayscale_stats(&gray);
    println!(
        "Grayscale range: {}-{}, mean: {:.2}, std dev: {:.2}",
        gray_stats.min, gray_stats.max, gray_stats.mean, gray_stats.std_dev
    );
    if gray_stats.std_dev == 0.0 {
        println!("Flat image: thresholds fall back to the local mean");
    }

    let binary = binarize_with(&gray, &config)?;
    let stats = binary_stats(&binary);
    println!(
        "Binary (window={}, k={}): foreground={} total={} foreground_ratio={:.2}%",
        config.window_size,
        config.k,
        stats.foreground,
        stats.total,
        stats.foreground_ratio * 100.0
    );
    Ok(())
}

fn batch_cmd(
    root: &Path,
    out_dir: &Path,
    limit: Option<usize>,
    threshold: &ThresholdArgs,
) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let images = collect_images(root, limit);
    log::info!("Found {} images under {}", images.len(), root.display());

    let start = Instant::now();
    let mut failures = 0usize;
    for path in &images {
        // Each image is independent; a bad file does not stop the batch
        if let Err(err) = batch_one(path, out_dir, threshold) {
            failures += 1;
            log::warn!("{}: {}", path.display(), err);
        }
    }

    log::info!(
        "Processed {} images ({} failed) in {:.2}s",
        images.len(),
        failures,
        start.elapsed().as_secs_f64()
    );
    if failures > 0 {
        return Err(Error::InvalidInput(format!(
            "{} of {} images failed",
            failures,
            images.len()
        )));
    }
    Ok(())
}

fn batch_one(path: &Path, out_dir: &Path, threshold: &ThresholdArgs) -> Result<()> {
    let rgb = load_rgb(path)?;
    let gray = to_grayscale(&rgb)?;
    let config = threshold.config(gray.width(), gray.height());
    let binary = binarize_with(&gray, &config)?;

    let (gray_path, binary_path) = output_paths(path, out_dir);
    save_gray(&gray, &gray_path)?;
    save_gray(&binary, &binary_path)?;

    let stats = binary_stats(&binary);
    log::debug!(
        "{} -> {} (foreground {:.2}%)",
        path.display(),
        binary_path.display(),
        stats.foreground_ratio * 100.0
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wolf_threshold::Raster;

    fn temp_dir(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("wolftool_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    fn threshold() -> ThresholdArgs {
        ThresholdArgs {
            window: Some(3),
            k: None,
            naive: false,
            parallel: false,
        }
    }

    #[test]
    fn test_batch_reports_failures() {
        let root = temp_dir("batch_root");
        let out_dir = temp_dir("batch_out");
        let page = Raster::gray(4, 4, (0..16u8).map(|v| v * 16).collect()).unwrap();
        save_gray(&page, root.join("page.png")).unwrap();

        assert!(batch_cmd(&root, &out_dir, None, &threshold()).is_ok());
        assert!(out_dir.join("page_binary.bmp").exists());

        // One unreadable image fails the whole run after the rest are written
        std::fs::write(root.join("broken.png"), b"not a png").unwrap();
        assert!(matches!(
            batch_cmd(&root, &out_dir, None, &threshold()),
            Err(Error::InvalidInput(_))
        ));
        let _ = std::fs::remove_dir_all(root);
        let _ = std::fs::remove_dir_all(out_dir);
    }
}
