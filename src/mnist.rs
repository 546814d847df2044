use crate::error::{DataError, DataResult};
use flate2::read::GzDecoder;
use itertools::Itertools;
use ndarray::Array1;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};
use tracing::{debug, info};

pub const IMAGE_PIXELS: usize = 28 * 28;
pub const CLASSES: usize = 10;

const IMAGE_MAGIC: u32 = 2051;
const LABEL_MAGIC: u32 = 2049;

/// A handwritten digit and its correct label. The pixels are the raw intensities as stored on
/// disk; scaling them for the network is left to the trainer and evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub label: usize,
    pub pixels: Array1<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdxSet {
    Training,
    Test,
}

impl IdxSet {
    fn file_names(self) -> (&'static str, &'static str) {
        match self {
            IdxSet::Training => ("train-images-idx3-ubyte.gz", "train-labels-idx1-ubyte.gz"),
            IdxSet::Test => ("t10k-images-idx3-ubyte.gz", "t10k-labels-idx1-ubyte.gz"),
        }
    }
}

/// Read one of the two MNIST sets from a directory holding the standard gzipped IDX files.
pub fn load_idx(directory: &Path, set: IdxSet) -> DataResult<Vec<Example>> {
    let (images, labels) = set.file_names();
    let image_bytes = read_gzipped(&directory.join(images))?;
    let label_bytes = read_gzipped(&directory.join(labels))?;
    let examples = parse_idx(&image_bytes, &label_bytes)?;
    info!(?set, count = examples.len(), "loaded IDX data");
    Ok(examples)
}

fn read_gzipped(path: &Path) -> DataResult<Vec<u8>> {
    let mut bytes = Vec::new();
    GzDecoder::new(File::open(path)?).read_to_end(&mut bytes)?;
    Ok(bytes)
}

// Reads `count` big-endian u32 header fields off the front of `bytes`, returning them together
// with the remaining body.
fn split_header<'a>(bytes: &'a [u8], count: usize, what: &str) -> DataResult<(Vec<u32>, &'a [u8])> {
    if bytes.len() < count * 4 {
        return Err(DataError::Format(format!(
            "{what} file is shorter than its {}-byte header",
            count * 4
        )));
    }
    let (header, body) = bytes.split_at(count * 4);
    let fields = header
        .chunks_exact(4)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    Ok((fields, body))
}

/// Decode the (already decompressed) bytes of an IDX image file and its IDX label file.
///
/// The image header is four big-endian u32s: the magic number 2051, the number of images, the
/// number of rows and the number of columns. The label header is two: the magic number 2049 and
/// the number of labels. After each header comes one byte per pixel or per label.
pub fn parse_idx(image_bytes: &[u8], label_bytes: &[u8]) -> DataResult<Vec<Example>> {
    let (image_header, pixels) = split_header(image_bytes, 4, "image")?;
    let (label_header, labels) = split_header(label_bytes, 2, "label")?;

    if image_header[0] != IMAGE_MAGIC {
        return Err(DataError::Format(format!(
            "image file magic number is {}, expected {IMAGE_MAGIC}",
            image_header[0]
        )));
    }
    if label_header[0] != LABEL_MAGIC {
        return Err(DataError::Format(format!(
            "label file magic number is {}, expected {LABEL_MAGIC}",
            label_header[0]
        )));
    }

    let images = image_header[1] as usize;
    let label_count = label_header[1] as usize;
    // The header fields are untrusted, so their products may not fit in a usize.
    let overflow = || DataError::Format("image dimensions overflow".to_string());
    let image_size = (image_header[2] as usize)
        .checked_mul(image_header[3] as usize)
        .ok_or_else(overflow)?;
    let body_size = images.checked_mul(image_size).ok_or_else(overflow)?;

    if images != label_count {
        return Err(DataError::Format(format!(
            "{images} images but {label_count} labels"
        )));
    }
    if image_size == 0 || pixels.len() != body_size {
        return Err(DataError::Format(format!(
            "image body holds {} bytes, expected {images} images of {image_size} pixels",
            pixels.len()
        )));
    }
    if labels.len() != label_count {
        return Err(DataError::Format(format!(
            "label body holds {} bytes, expected {label_count}",
            labels.len()
        )));
    }

    // Pair every image-sized chunk of pixel bytes with its label byte.
    let chunks = pixels.iter().copied().chunks(image_size);
    let examples = chunks
        .into_iter()
        .zip(labels)
        .map(|(chunk, &label)| Example {
            label: usize::from(label),
            pixels: chunk.collect(),
        })
        .collect();

    Ok(examples)
}

pub fn load_csv(path: &Path) -> DataResult<Vec<Example>> {
    let examples = parse_csv(BufReader::new(File::open(path)?), IMAGE_PIXELS)?;
    info!(path = %path.display(), count = examples.len(), "loaded CSV data");
    Ok(examples)
}

/// Parse CSV records of `label` followed by exactly `pixels` intensities in [0, 255]. Blank lines
/// are skipped; any other malformed line fails the whole read.
pub fn parse_csv<R: BufRead>(reader: R, pixels: usize) -> DataResult<Vec<Example>> {
    let mut examples = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let record = line.trim();
        if record.is_empty() {
            debug!(line = line_number, "skipping blank line");
            continue;
        }

        let parse_error = |message: String| DataError::Parse {
            line: line_number,
            message,
        };

        let mut fields = record.split(',').map(str::trim);
        let label = fields
            .next()
            .unwrap_or_default()
            .parse::<usize>()
            .map_err(|err| parse_error(format!("invalid label: {err}")))?;
        let values = fields
            .map(|field| {
                field
                    .parse::<u8>()
                    .map_err(|err| parse_error(format!("invalid pixel {field:?}: {err}")))
            })
            .collect::<DataResult<Array1<u8>>>()?;

        if values.len() != pixels {
            return Err(parse_error(format!(
                "record has {} pixels, expected {pixels}",
                values.len()
            )));
        }

        examples.push(Example {
            label,
            pixels: values,
        });
    }

    Ok(examples)
}
