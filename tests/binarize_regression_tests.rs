//! Integration tests for grayscale reduction and Wolf binarization
//!
//! These pin the border convention, the flat-image guard, parameter
//! validation and bit-for-bit reproducibility across the naive, summed-area
//! and row-parallel paths.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wolf_threshold::utils::padding::{reflect_pad, reflect_pad_row};
use wolf_threshold::{
    BACKGROUND, Binarizer, Error, FOREGROUND, Raster, WindowStrategy, WolfConfig, binarize,
    binarize_rgb, binarize_with, to_grayscale,
};

fn noise(width: usize, height: usize, seed: u64) -> Raster {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height).map(|_| rng.r#gen::<u8>()).collect();
    Raster::gray(width, height, data).unwrap()
}

/// Mirror without repeating the edge, written out longhand
fn mirror(mut i: isize, len: usize) -> usize {
    let last = len as isize - 1;
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}

/// Literal per-pixel transcription of the threshold rule, plus the flat guard
fn reference_wolf(gray: &Raster, window_size: usize, k: f64) -> Vec<u8> {
    let (w, h) = (gray.width(), gray.height());
    let all: Vec<f64> = gray.as_bytes().iter().map(|&v| v as f64).collect();
    let n = all.len() as f64;
    let global_mean = all.iter().sum::<f64>() / n;
    let global_std = (all.iter().map(|v| (v - global_mean).powi(2)).sum::<f64>() / n).sqrt();

    let half = (window_size / 2) as isize;
    let mut out = Vec::with_capacity(w * h);
    for y in 0..h as isize {
        for x in 0..w as isize {
            let mut window = Vec::with_capacity(window_size * window_size);
            for dy in -half..=half {
                for dx in -half..=half {
                    let sx = mirror(x + dx, w);
                    let sy = mirror(y + dy, h);
                    window.push(gray.get(sx, sy).unwrap() as f64);
                }
            }
            let m = window.iter().sum::<f64>() / window.len() as f64;
            let s = (window.iter().map(|v| (v - m).powi(2)).sum::<f64>() / window.len() as f64)
                .sqrt();
            let ratio = if global_std == 0.0 { 1.0 } else { s / global_std };
            let threshold = m * (1.0 + k * (ratio - 1.0));
            let value = gray.get(x as usize, y as usize).unwrap() as f64;
            out.push(if value > threshold { 255 } else { 0 });
        }
    }
    out
}

#[test]
fn test_padding_row_law() {
    assert_eq!(
        reflect_pad_row(&[10, 20, 30, 40], 2),
        vec![30, 20, 10, 20, 30, 40, 30, 20]
    );

    // Same law down a column
    let column = Raster::gray(2, 4, vec![10, 0, 20, 0, 30, 0, 40, 0]).unwrap();
    let padded = reflect_pad(&column, 2).unwrap();
    let left: Vec<u8> = (0..padded.height()).map(|y| padded.get(2, y)).collect();
    assert_eq!(left, vec![30, 20, 10, 20, 30, 40, 30, 20]);
}

#[test]
fn test_grayscale_truncates() {
    let rgb = Raster::rgb(1, 1, vec![100, 150, 200]).unwrap();
    assert_eq!(to_grayscale(&rgb).unwrap().as_bytes(), &[140]);
}

#[test]
fn test_noise_9x9_is_reproducible() {
    let gray = noise(9, 9, 0x5eed);
    let first = binarize(&gray, 7, 0.3).unwrap();
    let count = |r: &Raster| r.as_bytes().iter().filter(|&&v| v == FOREGROUND).count();

    for _ in 0..5 {
        let again = binarize(&gray, 7, 0.3).unwrap();
        assert_eq!(count(&again), count(&first));
        assert_eq!(again, first);
    }

    let naive = binarize_with(
        &gray,
        &WolfConfig::new(7, 0.3).with_strategy(WindowStrategy::Naive),
    )
    .unwrap();
    let parallel = binarize_with(&gray, &WolfConfig::new(7, 0.3).with_parallel(true)).unwrap();
    assert_eq!(naive, first);
    assert_eq!(parallel, first);
}

#[test]
fn test_matches_literal_reference() {
    for (seed, (w, h)) in [(1u64, (9usize, 9usize)), (2, (16, 5)), (3, (4, 13)), (4, (3, 3))] {
        let gray = noise(w, h, seed);
        for window_size in [1usize, 3, 7, 9] {
            let binary = binarize(&gray, window_size, 0.3).unwrap();
            assert_eq!(
                binary.as_bytes(),
                &reference_wolf(&gray, window_size, 0.3)[..],
                "seed {} window {}",
                seed,
                window_size
            );
        }
    }
}

#[test]
fn test_even_window_rejected_before_processing() {
    let binarizer = Binarizer::with_config(WolfConfig::new(6, 0.3));
    let gray = noise(9, 9, 7);
    assert!(matches!(
        binarizer.binarize(&gray),
        Err(Error::InvalidParameter(_))
    ));

    // The RGB pipeline checks parameters before reducing to grayscale
    let rgb = Raster::rgb(3, 3, vec![0; 27]).unwrap();
    assert!(matches!(
        binarize_rgb(&rgb, &WolfConfig::new(6, 0.3)),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn test_huge_window_is_an_error_not_a_panic() {
    let gray = noise(4, 4, 11);
    let oversized = wolf_threshold::config::DEFAULT_MAX_WINDOW_SIZE + 2;
    for window_size in [usize::MAX, oversized | 1] {
        let result = std::panic::catch_unwind(|| binarize(&gray, window_size, 0.3));
        assert!(
            matches!(result, Ok(Err(Error::InvalidParameter(_)))),
            "window {}",
            window_size
        );
    }

    let rgb = Raster::rgb(4, 4, vec![90; 48]).unwrap();
    assert!(matches!(
        binarize_rgb(&rgb, &WolfConfig::new(usize::MAX, 0.3)),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn test_dark_text_on_bright_page() {
    // Bright page with a dark 2-pixel stroke down the middle
    let (w, h) = (20, 12);
    let mut data = vec![210u8; w * h];
    for y in 0..h {
        data[y * w + 9] = 40;
        data[y * w + 10] = 40;
    }
    let gray = Raster::gray(w, h, data).unwrap();
    let binary = binarize(&gray, 7, 0.3).unwrap();

    for y in 0..h {
        assert_eq!(binary.get(9, y), Some(BACKGROUND));
        assert_eq!(binary.get(10, y), Some(BACKGROUND));
        assert_eq!(binary.get(0, y), Some(FOREGROUND));
        assert_eq!(binary.get(19, y), Some(FOREGROUND));
    }
}

proptest! {
    #[test]
    fn prop_output_is_binary_and_same_size(
        (w, h, data) in (2usize..12, 2usize..12).prop_flat_map(|(w, h)| {
            (Just(w), Just(h), prop::collection::vec(any::<u8>(), w * h))
        }),
        half in 0usize..5,
        k in -1.0f64..1.0,
    ) {
        let gray = Raster::gray(w, h, data).unwrap();
        let binary = binarize(&gray, 2 * half + 1, k).unwrap();
        prop_assert_eq!(binary.width(), w);
        prop_assert_eq!(binary.height(), h);
        prop_assert_eq!(binary.channels(), 1);
        prop_assert!(binary.as_bytes().iter().all(|&v| v == FOREGROUND || v == BACKGROUND));
    }

    #[test]
    fn prop_flat_image_is_all_background(
        w in 2usize..10,
        h in 2usize..10,
        value in 1u8..=255,
        half in 0usize..6,
        k in -1.0f64..1.0,
    ) {
        let gray = Raster::filled(w, h, 1, value).unwrap();
        let binary = binarize(&gray, 2 * half + 1, k).unwrap();
        prop_assert!(binary.as_bytes().iter().all(|&v| v == BACKGROUND));
    }
}
