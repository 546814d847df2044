//! Conversions from raw records into the vectors the network consumes.
//!
//! Neither the inputs nor the targets ever reach exactly 0 or 1: the sigmoid only approaches those
//! values asymptotically, and a zero input would switch off learning for every weight attached to it.

use crate::error::{NetworkError, NetworkResult};
use ndarray::{Array, Array1, ArrayView1};

pub const TARGET_LOW: f64 = 0.01;
pub const TARGET_HIGH: f64 = 0.99;

// [0, 255] -> [0.01, 1.0]
pub fn scale_features(raw: ArrayView1<'_, u8>) -> Array1<f64> {
    raw.mapv(|value| f64::from(value) / 255.0 * 0.99 + 0.01)
}

/// A vector of `classes` entries, all 0.01 except the one at `label`, which is 0.99.
pub fn encode_target(label: usize, classes: usize) -> NetworkResult<Array1<f64>> {
    if label >= classes {
        return Err(NetworkError::Range { label, classes });
    }
    Ok(Array::from_shape_fn(classes, |i| {
        if i == label { TARGET_HIGH } else { TARGET_LOW }
    }))
}
