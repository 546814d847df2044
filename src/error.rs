use std::error::Error;
use std::fmt;
use std::io;

/// Errors raised by the learning engine. None of them are retryable: they mean the caller handed
/// over bad parameters or bad data.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// A layer size of zero or a learning rate that is not a finite positive number.
    Configuration(String),
    /// A vector or matrix whose length/shape does not match the configured layer sizes.
    Dimension {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A class label outside `0..classes`.
    Range { label: usize, classes: usize },
    /// An evaluation pass over zero examples.
    EmptyInput,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            NetworkError::Dimension {
                what,
                expected,
                found,
            } => write!(
                f,
                "Dimension mismatch: {} has length {}, expected {}",
                what, found, expected
            ),
            NetworkError::Range { label, classes } => {
                write!(f, "Label {} is outside the range 0..{}", label, classes)
            }
            NetworkError::EmptyInput => write!(f, "Cannot evaluate over zero examples"),
        }
    }
}

impl Error for NetworkError {}

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors raised while reading a data set from disk.
#[derive(Debug)]
pub enum DataError {
    Io(io::Error),
    /// A malformed CSV record. Lines are counted from 1.
    Parse { line: usize, message: String },
    /// A binary file whose header or length is not what the format demands.
    Format(String),
    Image(image::ImageError),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Io(err) => write!(f, "I/O error: {}", err),
            DataError::Parse { line, message } => write!(f, "Line {}: {}", line, message),
            DataError::Format(msg) => write!(f, "Malformed data: {}", msg),
            DataError::Image(err) => write!(f, "Image decode error: {}", err),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataError::Io(err) => Some(err),
            DataError::Image(err) => Some(err),
            DataError::Parse { .. } | DataError::Format(_) => None,
        }
    }
}

impl From<io::Error> for DataError {
    fn from(err: io::Error) -> Self {
        DataError::Io(err)
    }
}

impl From<image::ImageError> for DataError {
    fn from(err: image::ImageError) -> Self {
        DataError::Image(err)
    }
}

pub type DataResult<T> = Result<T, DataError>;
