//! End-to-end behaviour of the learning engine:
//! - every prediction is a vector of independent probabilities in (0, 1)
//! - a single training step moves the output towards its target
//! - a few passes over a separable data set are enough to classify it

use digit_identifier::{
    Evaluator, Example, Network, Trainer, encode_target, mnist::parse_csv, scale_features,
};
use ndarray::Array1;
use ndarray_rand::rand::{Rng, SeedableRng, rngs::StdRng};
use proptest::prelude::*;

fn random_pixels(rng: &mut StdRng, len: usize) -> Array1<u8> {
    (0..len).map(|_| rng.gen_range(0..=255u8)).collect()
}

fn squared_error(output: &Array1<f64>, target: &Array1<f64>) -> f64 {
    (target - output).mapv(|e| e * e).sum()
}

proptest! {
    #[test]
    fn outputs_are_strictly_between_zero_and_one(
        input_size in 1usize..32,
        hidden_size in 1usize..32,
        output_size in 1usize..12,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let network = Network::with_rng(input_size, hidden_size, output_size, 0.1, &mut rng).unwrap();
        let input = scale_features(random_pixels(&mut rng, input_size).view());

        let output = network.predict(&input).unwrap();

        prop_assert_eq!(output.len(), output_size);
        prop_assert!(output.iter().all(|&y| y > 0.0 && y < 1.0));
    }
}

#[test]
fn single_step_moves_output_towards_target() {
    let mut improved = 0;

    for seed in 0..10u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut network = Network::with_rng(784, 100, 10, 0.1, &mut rng).unwrap();
        let label = (seed % 10) as usize;
        let input = scale_features(random_pixels(&mut rng, 784).view());
        let target = encode_target(label, 10).unwrap();

        let before = network.predict(&input).unwrap();
        network.train(&input, &target).unwrap();
        let after = network.predict(&input).unwrap();

        if after[label] > before[label]
            && squared_error(&after, &target) < squared_error(&before, &target)
        {
            improved += 1;
        }
    }

    assert!(improved >= 9, "only {improved} of 10 initializations improved");
}

// Four-by-four images: class 0 lights up the left half, class 1 the right half.
fn half_lit_examples(rng: &mut StdRng, count: usize) -> Vec<Example> {
    (0..count)
        .map(|i| {
            let label = i % 2;
            let pixels = (0..16)
                .map(|pixel| {
                    let left = pixel % 4 < 2;
                    if left == (label == 0) {
                        rng.gen_range(180..=255u8)
                    } else {
                        rng.gen_range(0..=60u8)
                    }
                })
                .collect();
            Example { label, pixels }
        })
        .collect()
}

#[test]
fn learns_separable_data() {
    let mut rng = StdRng::seed_from_u64(42);
    let training = half_lit_examples(&mut rng, 200);
    let test = half_lit_examples(&mut rng, 50);
    let mut network = Network::with_rng(16, 8, 2, 0.3, &mut rng).unwrap();

    let trainer = Trainer::default();
    for _ in 0..5 {
        trainer.run(&mut network, &training).unwrap();
    }

    let accuracy = Evaluator::run(&network, &test).unwrap();
    assert!(accuracy >= 0.9, "accuracy was {accuracy}");
}

#[test]
fn csv_records_flow_through_training_and_evaluation() {
    let csv = "0,255,255,0,0\n1,0,0,255,255\n0,250,240,10,0\n1,5,0,230,255\n";
    let examples = parse_csv(csv.as_bytes(), 4).unwrap();
    let mut network = Network::with_rng(4, 6, 2, 0.5, &mut StdRng::seed_from_u64(3)).unwrap();

    let trainer = Trainer::default();
    for _ in 0..200 {
        trainer.run(&mut network, &examples).unwrap();
    }

    assert_eq!(Evaluator::run(&network, &examples).unwrap(), 1.0);
}
