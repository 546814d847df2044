//! Hand-drawn digits stored as PNG files, one digit per file.
//!
//! The label is the last character of the file stem, so `my_own_7.png` is a 7. Files are
//! decoded to 8-bit grayscale and resized to 28 x 28 when they aren't already. MNIST stores light
//! ink on a dark background while drawings are usually dark ink on white paper, so every
//! intensity is inverted to `255 - v`.

use crate::error::DataResult;
use crate::mnist::Example;
use image::{GrayImage, imageops::FilterType};
use ndarray::Array1;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

const SIDE: u32 = 28;

/// Load every labelled `*.png` under `directory`, in path order. PNGs whose stem doesn't end in a
/// digit are skipped with a warning.
pub fn load_png_directory(directory: &Path) -> DataResult<Vec<Example>> {
    let mut paths = fs::read_dir(directory)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<PathBuf>, _>>()?;
    paths.retain(|path| {
        path.extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("png"))
    });
    paths.sort();

    let mut examples = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(label) = label_from_file_name(&path) else {
            warn!(path = %path.display(), "no digit at the end of the file name, skipping");
            continue;
        };
        let pixels = pixels_from_image(image::open(&path)?.to_luma8());
        debug!(path = %path.display(), label, "loaded image");
        examples.push(Example { label, pixels });
    }

    info!(directory = %directory.display(), count = examples.len(), "loaded PNG data");
    Ok(examples)
}

pub fn label_from_file_name(path: &Path) -> Option<usize> {
    let digit = path.file_stem()?.to_str()?.chars().last()?.to_digit(10)?;
    Some(digit as usize)
}

/// Flatten a grayscale image into 784 inverted intensities, row by row.
pub fn pixels_from_image(image: GrayImage) -> Array1<u8> {
    let image = if image.dimensions() == (SIDE, SIDE) {
        image
    } else {
        image::imageops::resize(&image, SIDE, SIDE, FilterType::Triangle)
    };
    image.into_raw().into_iter().map(|value| 255 - value).collect()
}
