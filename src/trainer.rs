use crate::encoding::{encode_target, scale_features};
use crate::error::NetworkResult;
use crate::mnist::Example;
use crate::network::{Activation, Network};
use tracing::{debug, info};

/// Feeds a training set through a network once, one example at a time and in order. Every step
/// sees the weights left behind by the step before it.
#[derive(Debug, Clone, Copy)]
pub struct Trainer {
    /// Log progress every this many examples. Zero disables progress logging.
    pub progress_every: usize,
}

impl Default for Trainer {
    fn default() -> Self {
        Trainer {
            progress_every: 10_000,
        }
    }
}

impl Trainer {
    /// Train `network` on every example. The first example that can't be encoded or doesn't fit
    /// the network aborts the pass; the examples before it have already been learned.
    pub fn run<'a, A, I>(&self, network: &mut Network<A>, examples: I) -> NetworkResult<()>
    where
        A: Activation,
        I: IntoIterator<Item = &'a Example>,
    {
        let mut trained = 0;
        for example in examples {
            let input = scale_features(example.pixels.view());
            let target = encode_target(example.label, network.output_size())?;
            network.train(&input, &target)?;

            trained += 1;
            if self.progress_every > 0 && trained % self.progress_every == 0 {
                debug!(trained, "training progress");
            }
        }
        info!(trained, "training pass complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use ndarray::arr1;
    use ndarray_rand::rand::{SeedableRng, rngs::StdRng};

    fn example(label: usize, pixels: &[u8]) -> Example {
        Example {
            label,
            pixels: arr1(pixels),
        }
    }

    #[test]
    fn empty_pass_leaves_weights_alone() {
        let mut network = Network::with_rng(2, 2, 2, 0.1, &mut StdRng::seed_from_u64(0)).unwrap();
        let before = network.clone();
        let examples: Vec<Example> = Vec::new();
        Trainer::default().run(&mut network, &examples).unwrap();
        assert_eq!(network.weights_input_hidden(), before.weights_input_hidden());
        assert_eq!(network.weights_hidden_output(), before.weights_hidden_output());
    }

    #[test]
    fn pass_matches_manual_training_in_order() {
        let examples = vec![example(0, &[255, 0]), example(1, &[0, 255]), example(1, &[30, 200])];
        let start = Network::with_rng(2, 3, 2, 0.3, &mut StdRng::seed_from_u64(7)).unwrap();

        let mut trained = start.clone();
        Trainer::default().run(&mut trained, &examples).unwrap();

        let mut manual = start;
        for example in &examples {
            manual
                .train(
                    &scale_features(example.pixels.view()),
                    &encode_target(example.label, 2).unwrap(),
                )
                .unwrap();
        }

        assert_eq!(trained.weights_input_hidden(), manual.weights_input_hidden());
        assert_eq!(trained.weights_hidden_output(), manual.weights_hidden_output());
    }

    #[test]
    fn out_of_range_label_aborts_pass() {
        let mut network = Network::with_rng(2, 2, 2, 0.1, &mut StdRng::seed_from_u64(0)).unwrap();
        let examples = vec![example(0, &[1, 2]), example(2, &[3, 4]), example(1, &[5, 6])];
        assert_eq!(
            Trainer::default().run(&mut network, &examples).unwrap_err(),
            NetworkError::Range {
                label: 2,
                classes: 2
            }
        );
    }

    #[test]
    fn wrong_pixel_count_aborts_pass() {
        let mut network = Network::with_rng(2, 2, 2, 0.1, &mut StdRng::seed_from_u64(0)).unwrap();
        let examples = vec![example(0, &[1, 2, 3])];
        assert!(matches!(
            Trainer::default().run(&mut network, &examples),
            Err(NetworkError::Dimension { what: "input vector", .. })
        ));
    }
}
