use crate::encoding::scale_features;
use crate::error::{NetworkError, NetworkResult};
use crate::mnist::Example;
use crate::network::{Activation, Network};
use ndarray::ArrayView1;
use std::cmp::Ordering;
use tracing::{info, trace};

/// The index of the largest value, or `None` for an empty vector. When several entries share the
/// maximum the lowest index wins.
pub fn argmax(values: ArrayView1<'_, f64>) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, &value)| match best {
            Some((_, best_value)) if value.total_cmp(&best_value) != Ordering::Greater => best,
            _ => Some((index, value)),
        })
        .map(|(index, _)| index)
}

/// One outcome per evaluated example: 1 for a correct prediction, 0 for a wrong one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scorecard {
    outcomes: Vec<u8>,
}

impl Scorecard {
    pub fn record(&mut self, correct: bool) {
        self.outcomes.push(u8::from(correct));
    }

    pub fn outcomes(&self) -> &[u8] {
        &self.outcomes
    }

    pub fn correct(&self) -> usize {
        self.outcomes.iter().map(|&outcome| usize::from(outcome)).sum()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    // An empty scorecard has no accuracy, rather than NaN.
    pub fn accuracy(&self) -> NetworkResult<f64> {
        if self.is_empty() {
            return Err(NetworkError::EmptyInput);
        }
        Ok(self.correct() as f64 / self.len() as f64)
    }
}

pub struct Evaluator;

impl Evaluator {
    /// The fraction of `examples` whose label is the network's arg-max output.
    ///
    /// A label outside `0..network.output_size()` is not scored as a miss: it aborts the whole
    /// pass with [`NetworkError::Range`], as does an input of the wrong length. An empty set of
    /// examples gives [`NetworkError::EmptyInput`].
    pub fn run<'a, A, I>(network: &Network<A>, examples: I) -> NetworkResult<f64>
    where
        A: Activation,
        I: IntoIterator<Item = &'a Example>,
    {
        let scorecard = Evaluator::scorecard(network, examples)?;
        let accuracy = scorecard.accuracy()?;
        info!(
            correct = scorecard.correct(),
            total = scorecard.len(),
            accuracy,
            "evaluation complete"
        );
        Ok(accuracy)
    }

    // Same rules as `run`, but keeps the per-example outcomes.
    pub fn scorecard<'a, A, I>(network: &Network<A>, examples: I) -> NetworkResult<Scorecard>
    where
        A: Activation,
        I: IntoIterator<Item = &'a Example>,
    {
        let mut scorecard = Scorecard::default();
        for example in examples {
            if example.label >= network.output_size() {
                return Err(NetworkError::Range {
                    label: example.label,
                    classes: network.output_size(),
                });
            }

            let outputs = network.predict(&scale_features(example.pixels.view()))?;
            // The network always has at least one output neuron.
            let predicted = argmax(outputs.view()).unwrap_or_default();
            if predicted != example.label {
                trace!(expected = example.label, predicted, "misclassified");
            }
            scorecard.record(predicted == example.label);
        }
        Ok(scorecard)
    }
}
