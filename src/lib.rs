//! A feed-forward network with a single sigmoid hidden layer, trained one example at a time to
//! recognise handwritten digits.
//!
//! A run goes: construct a [`Network`], hand it mutably to a [`Trainer`] for one or more passes
//! over the training set, then hand it immutably to the [`Evaluator`] for an accuracy score.

pub mod encoding;
pub mod error;
pub mod evaluator;
pub mod images;
pub mod mnist;
pub mod network;
pub mod trainer;

pub use encoding::{encode_target, scale_features};
pub use error::{DataError, DataResult, NetworkError, NetworkResult};
pub use evaluator::{Evaluator, Scorecard, argmax};
pub use mnist::Example;
pub use network::{Activation, Network, Sigmoid};
pub use trainer::Trainer;
