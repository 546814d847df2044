use crate::app_config::{AppConfig, Settings};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use digit_identifier::{
    Evaluator, Example, Network, Trainer,
    images::load_png_directory,
    mnist::{CLASSES, IMAGE_PIXELS, IdxSet, load_csv, load_idx},
};
use ndarray_rand::rand::{SeedableRng, rngs::StdRng};
use std::path::PathBuf;
use tracing::info;

/// Train a one-hidden-layer network on handwritten digits, then report its accuracy on a test set.
#[derive(Parser, Debug)]
#[command(name = "digit-identifier", version, about)]
pub struct Cli {
    /// YAML file with default settings; command-line flags override it
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Neurons in the hidden layer [default: 200]
    #[arg(long, value_name = "INT")]
    hidden_nodes: Option<usize>,
    /// Step size of every weight update [default: 0.1]
    #[arg(long, value_name = "FLOAT")]
    learning_rate: Option<f64>,
    /// Passes over the training set [default: 1]
    #[arg(short, long, value_name = "INT")]
    epochs: Option<usize>,
    /// Seed for the initial weights
    #[arg(long, value_name = "INT")]
    seed: Option<u64>,
    /// Training data: a CSV file, or a directory of gzipped IDX files
    #[arg(long, value_name = "PATH")]
    train: PathBuf,
    /// Layout of the training data
    #[arg(long, value_enum, default_value_t = TrainFormat::Csv)]
    train_format: TrainFormat,
    /// Where the test examples come from
    #[command(subcommand)]
    test: TestSource,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TrainFormat {
    /// `label,pixel,...` records
    Csv,
    /// train-images-idx3-ubyte.gz and train-labels-idx1-ubyte.gz
    Idx,
}

#[derive(Subcommand, Debug, PartialEq)]
enum TestSource {
    /// Test with a CSV file of `label,pixel,...` records
    Csv {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Test with t10k-images-idx3-ubyte.gz and t10k-labels-idx1-ubyte.gz from a directory
    Idx {
        #[arg(value_name = "DIR")]
        directory: PathBuf,
    },
    /// Test with 28x28 PNG drawings named `..._<digit>.png`
    Images {
        #[arg(value_name = "DIR")]
        directory: PathBuf,
    },
}

impl TestSource {
    fn load(&self) -> Result<Vec<Example>> {
        let examples = match self {
            TestSource::Csv { path } => {
                load_csv(path).with_context(|| format!("loading {}", path.display()))?
            }
            TestSource::Idx { directory } => load_idx(directory, IdxSet::Test)
                .with_context(|| format!("loading IDX test set from {}", directory.display()))?,
            TestSource::Images { directory } => load_png_directory(directory)
                .with_context(|| format!("loading images from {}", directory.display()))?,
        };
        Ok(examples)
    }
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        let flags = AppConfig {
            hidden_nodes: self.hidden_nodes,
            learning_rate: self.learning_rate,
            epochs: self.epochs,
            seed: self.seed,
        };
        Ok(file.merge(flags).resolve())
    }

    fn load_training(&self) -> Result<Vec<Example>> {
        let examples = match self.train_format {
            TrainFormat::Csv => load_csv(&self.train),
            TrainFormat::Idx => load_idx(&self.train, IdxSet::Training),
        }
        .with_context(|| format!("loading training data from {}", self.train.display()))?;
        Ok(examples)
    }

    pub fn run(self) -> Result<()> {
        let performance = self.train_and_test()?;
        println!("Performance = {performance}");
        Ok(())
    }

    // Build the network, train it, then score it against the chosen test set.
    fn train_and_test(&self) -> Result<f64> {
        let settings = self.settings()?;

        info!(?settings, "creating neural network");
        let mut network = match settings.seed {
            Some(seed) => Network::with_rng(
                IMAGE_PIXELS,
                settings.hidden_nodes,
                CLASSES,
                settings.learning_rate,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => Network::new(
                IMAGE_PIXELS,
                settings.hidden_nodes,
                CLASSES,
                settings.learning_rate,
            ),
        }?;

        let training_data = self.load_training()?;
        let trainer = Trainer::default();
        for epoch in 1..=settings.epochs {
            info!(epoch, of = settings.epochs, "training neural network");
            trainer.run(&mut network, &training_data)?;
        }

        let test_data = self.test.load()?;
        info!(count = test_data.len(), "testing neural network");
        Ok(Evaluator::run(&network, &test_data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags_and_test_source() {
        let cli = Cli::try_parse_from([
            "digit-identifier",
            "--train",
            "data/mnist",
            "--train-format",
            "idx",
            "--epochs",
            "3",
            "--seed",
            "11",
            "images",
            "my_own_images",
        ])
        .unwrap();

        assert_eq!(cli.train_format, TrainFormat::Idx);
        assert_eq!(
            cli.test,
            TestSource::Images {
                directory: PathBuf::from("my_own_images")
            }
        );
        let settings = cli.settings().unwrap();
        assert_eq!(settings.epochs, 3);
        assert_eq!(settings.seed, Some(11));
        assert_eq!(settings.hidden_nodes, 200);
    }

    // Label 0 lights up the first half of the image, label 1 the second half.
    fn half_lit_csv(count: usize) -> String {
        (0..count)
            .map(|i| {
                let label = i % 2;
                let pixels = (0..IMAGE_PIXELS)
                    .map(|pixel| {
                        if (pixel < IMAGE_PIXELS / 2) == (label == 0) {
                            "255"
                        } else {
                            "0"
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{label},{pixels}\n")
            })
            .collect()
    }

    #[test]
    fn trains_and_tests_from_csv_files() {
        let dir = std::env::temp_dir().join("digit_identifier_cli_run");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let train = dir.join("train.csv");
        let test = dir.join("test.csv");
        let config = dir.join("settings.yaml");
        std::fs::write(&train, half_lit_csv(20)).unwrap();
        std::fs::write(&test, half_lit_csv(6)).unwrap();
        std::fs::write(&config, "hidden_nodes: 10\nlearning_rate: 0.1\nepochs: 1\n").unwrap();

        let args: Vec<OsString> = vec![
            "digit-identifier".into(),
            "--config".into(),
            config.clone().into_os_string(),
            "--epochs".into(),
            "10".into(),
            "--seed".into(),
            "5".into(),
            "--train".into(),
            train.clone().into_os_string(),
            "csv".into(),
            test.clone().into_os_string(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        let settings = cli.settings().unwrap();
        assert_eq!(settings.hidden_nodes, 10);
        assert_eq!(settings.epochs, 10);
        assert_eq!(cli.train_and_test().unwrap(), 1.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_training_file_names_the_path() {
        let cli = Cli::try_parse_from([
            "digit-identifier",
            "--train",
            "no/such/train.csv",
            "csv",
            "no/such/test.csv",
        ])
        .unwrap();
        let err = cli.train_and_test().unwrap_err();
        assert!(format!("{err:#}").contains("no/such/train.csv"));
    }

    #[test]
    fn test_source_is_required() {
        assert!(Cli::try_parse_from(["digit-identifier", "--train", "train.csv"]).is_err());
    }
}
