use crate::error::{NetworkError, NetworkResult};
use ndarray::{Array, Array1, Array2, Axis};
use ndarray_rand::{
    RandomExt,
    rand::{Rng, thread_rng},
    rand_distr::Normal,
};

/// An element-wise activation function. Implementations must be stateless: the network calls
/// them for every neuron of every example.
pub trait Activation {
    fn activate(&self, z: f64) -> f64;

    /// The derivative of the activation, expressed in terms of the activation's own output
    /// `y = activate(z)` rather than `z`. Training only ever has the outputs at hand.
    fn derivative_from_output(&self, y: f64) -> f64;
}

/// The logistic function σ(z) = 1 / (1 + e^-z), squashing every input into (0, 1).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn activate(&self, z: f64) -> f64 {
        sigmoid(z)
    }

    fn derivative_from_output(&self, y: f64) -> f64 {
        y * (1.0 - y)
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + f64::exp(-z))
}

/// A fully-connected network with one input layer, one hidden layer and one output layer, trained
/// one example at a time.
#[derive(Debug, Clone)]
pub struct Network<A = Sigmoid> {
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
    learning_rate: f64,
    // [hidden_size x input_size]
    weights_input_hidden: Array2<f64>,
    // [output_size x hidden_size]
    weights_hidden_output: Array2<f64>,
    activation: A,
}

impl Network<Sigmoid> {
    /// Build a sigmoid network with weights drawn from the thread-local RNG.
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        learning_rate: f64,
    ) -> NetworkResult<Network> {
        Network::with_rng(
            input_size,
            hidden_size,
            output_size,
            learning_rate,
            &mut thread_rng(),
        )
    }

    /// Build a sigmoid network with weights drawn from `rng`, so a seeded RNG gives a
    /// reproducible network.
    pub fn with_rng<R: Rng + ?Sized>(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        learning_rate: f64,
        rng: &mut R,
    ) -> NetworkResult<Network> {
        Network::with_activation(
            input_size,
            hidden_size,
            output_size,
            learning_rate,
            Sigmoid,
            rng,
        )
    }

    pub fn from_weights(
        weights_input_hidden: Array2<f64>,
        weights_hidden_output: Array2<f64>,
        learning_rate: f64,
    ) -> NetworkResult<Network> {
        Network::from_weights_with_activation(
            weights_input_hidden,
            weights_hidden_output,
            learning_rate,
            Sigmoid,
        )
    }
}

impl<A: Activation> Network<A> {
    pub fn with_activation<R: Rng + ?Sized>(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        learning_rate: f64,
        activation: A,
        rng: &mut R,
    ) -> NetworkResult<Network<A>> {
        validate_configuration(input_size, hidden_size, output_size, learning_rate)?;

        // Each layer's weights are drawn from a normal distribution with mean 0 and standard
        // deviation 1/sqrt(n), where n is the number of links feeding into each neuron of that
        // layer. This keeps the pre-activations of a fresh network away from the flat tails of
        // the sigmoid.
        let weights_input_hidden =
            Array::random_using((hidden_size, input_size), fan_in_normal(input_size)?, rng);
        let weights_hidden_output =
            Array::random_using((output_size, hidden_size), fan_in_normal(hidden_size)?, rng);

        Ok(Network {
            input_size,
            hidden_size,
            output_size,
            learning_rate,
            weights_input_hidden,
            weights_hidden_output,
            activation,
        })
    }

    /// Build a network around existing weight matrices. The layer sizes are read off the matrix
    /// shapes, which must chain: `[hidden x input]` followed by `[output x hidden]`.
    pub fn from_weights_with_activation(
        weights_input_hidden: Array2<f64>,
        weights_hidden_output: Array2<f64>,
        learning_rate: f64,
        activation: A,
    ) -> NetworkResult<Network<A>> {
        let (hidden_size, input_size) = weights_input_hidden.dim();
        let (output_size, hidden_columns) = weights_hidden_output.dim();
        validate_configuration(input_size, hidden_size, output_size, learning_rate)?;
        check_length("hidden-to-output weight columns", hidden_columns, hidden_size)?;

        Ok(Network {
            input_size,
            hidden_size,
            output_size,
            learning_rate,
            weights_input_hidden,
            weights_hidden_output,
            activation,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn weights_input_hidden(&self) -> &Array2<f64> {
        &self.weights_input_hidden
    }

    pub fn weights_hidden_output(&self) -> &Array2<f64> {
        &self.weights_hidden_output
    }

    // Calculates the activations of the hidden layer and of the output layer, given the
    // activations of the input layer. Both are returned because training needs the hidden
    // activations to attribute the output error back to the input-to-hidden weights.
    fn forward(&self, input: &Array1<f64>) -> NetworkResult<(Array1<f64>, Array1<f64>)> {
        check_length("input vector", input.len(), self.input_size)?;

        let hidden_outputs = self
            .weights_input_hidden
            .dot(input)
            .mapv_into(|z| self.activation.activate(z));
        let final_outputs = self
            .weights_hidden_output
            .dot(&hidden_outputs)
            .mapv_into(|z| self.activation.activate(z));

        Ok((hidden_outputs, final_outputs))
    }

    /// Run the network on a scaled input vector and return the output layer's activations, one
    /// per class. With the sigmoid each entry lies in (0, 1) independently of the others; the
    /// vector is not normalized.
    pub fn predict(&self, input: &Array1<f64>) -> NetworkResult<Array1<f64>> {
        self.forward(input).map(|(_, final_outputs)| final_outputs)
    }

    /// Adjust both weight matrices by one gradient step towards `target` for this single example.
    ///
    /// The hidden layer's error is the output error carried back through the transposed
    /// hidden-to-output weights as is, without first multiplying it by the output activation's
    /// derivative. Textbook backpropagation would chain that derivative in. This network
    /// deliberately doesn't: its convergence behaviour depends on the unscaled error.
    pub fn train(&mut self, input: &Array1<f64>, target: &Array1<f64>) -> NetworkResult<()> {
        check_length("target vector", target.len(), self.output_size)?;
        let (hidden_outputs, final_outputs) = self.forward(input)?;

        // The error is target - output, so adding the deltas below moves the outputs towards
        // the target.
        let output_errors = target - &final_outputs;
        let hidden_errors = self.weights_hidden_output.t().dot(&output_errors);

        let output_gradient = output_errors
            * final_outputs.mapv(|y| self.activation.derivative_from_output(y));
        let hidden_gradient = hidden_errors
            * hidden_outputs.mapv(|y| self.activation.derivative_from_output(y));

        // Both deltas are computed before either matrix changes, so the input-to-hidden update
        // sees the same hidden-to-output weights the error was attributed through.
        let delta_hidden_output = outer(&output_gradient, &hidden_outputs);
        let delta_input_hidden = outer(&hidden_gradient, input);

        self.weights_hidden_output
            .scaled_add(self.learning_rate, &delta_hidden_output);
        self.weights_input_hidden
            .scaled_add(self.learning_rate, &delta_input_hidden);

        Ok(())
    }
}

// [n x 1] . [1 x m] = [n x m]
fn outer(column: &Array1<f64>, row: &Array1<f64>) -> Array2<f64> {
    column
        .view()
        .insert_axis(Axis(1))
        .dot(&row.view().insert_axis(Axis(0)))
}

fn fan_in_normal(fan_in: usize) -> NetworkResult<Normal<f64>> {
    Normal::new(0.0, (fan_in as f64).powf(-0.5))
        .map_err(|err| NetworkError::Configuration(err.to_string()))
}

fn validate_configuration(
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
    learning_rate: f64,
) -> NetworkResult<()> {
    for (name, size) in [
        ("input size", input_size),
        ("hidden size", hidden_size),
        ("output size", output_size),
    ] {
        if size == 0 {
            return Err(NetworkError::Configuration(format!(
                "{name} must be greater than zero"
            )));
        }
    }
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(NetworkError::Configuration(format!(
            "learning rate must be a finite positive number, got {learning_rate}"
        )));
    }
    Ok(())
}

pub(crate) fn check_length(what: &'static str, found: usize, expected: usize) -> NetworkResult<()> {
    if found == expected {
        Ok(())
    } else {
        Err(NetworkError::Dimension {
            what,
            expected,
            found,
        })
    }
}
