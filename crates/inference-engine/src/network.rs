//! Dense Feed-Forward Network

use crate::predictor::Predictor;
use crate::InferenceError;
use feature_scaler::{ScaledFeatureVector, FEATURE_COUNT};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Activation applied after a dense layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Identity,
    Relu,
}

/// One fully connected layer: `activation(x · W + b)`
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    /// Shape (inputs, outputs)
    weights: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

impl DenseLayer {
    pub fn new(
        weights: Array2<f32>,
        bias: Array1<f32>,
        activation: Activation,
    ) -> Result<Self, InferenceError> {
        if bias.len() != weights.ncols() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("bias of length {}", weights.ncols()),
                actual: format!("bias of length {}", bias.len()),
            });
        }
        Ok(Self {
            weights,
            bias,
            activation,
        })
    }

    /// Build a layer from row-major weights of shape (inputs, outputs)
    pub fn from_row_major(
        inputs: usize,
        outputs: usize,
        weights: Vec<f32>,
        bias: Vec<f32>,
        activation: Activation,
    ) -> Result<Self, InferenceError> {
        let actual = weights.len();
        let weights = Array2::from_shape_vec((inputs, outputs), weights).map_err(|_| {
            InferenceError::InvalidInputShape {
                expected: format!("{} weights ({}x{})", inputs * outputs, inputs, outputs),
                actual: format!("{} weights", actual),
            }
        })?;
        Self::new(weights, Array1::from(bias), activation)
    }

    pub fn inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn outputs(&self) -> usize {
        self.weights.ncols()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn bias(&self) -> &Array1<f32> {
        &self.bias
    }

    fn forward(&self, input: &ArrayView1<f32>) -> Array1<f32> {
        let mut z = input.dot(&self.weights) + &self.bias;
        if self.activation == Activation::Relu {
            z.mapv_inplace(|v| v.max(0.0));
        }
        z
    }
}

/// Stack of dense layers mapping 4 scaled features to 1 output.
///
/// Shapes are checked once at construction; `predict` cannot see a
/// malformed topology.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, InferenceError> {
        let Some(first) = layers.first() else {
            return Err(InferenceError::ModelLoadError(
                "network has no layers".to_string(),
            ));
        };
        if first.inputs() != FEATURE_COUNT {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} inputs", FEATURE_COUNT),
                actual: format!("{} inputs", first.inputs()),
            });
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].outputs() != pair[1].inputs() {
                return Err(InferenceError::InvalidInputShape {
                    expected: format!("layer {} with {} inputs", i + 1, pair[0].outputs()),
                    actual: format!("{} inputs", pair[1].inputs()),
                });
            }
        }
        let last = layers.last().map(DenseLayer::outputs).unwrap_or_default();
        if last != 1 {
            return Err(InferenceError::InvalidInputShape {
                expected: "1 output".to_string(),
                actual: format!("{} outputs", last),
            });
        }
        Ok(Self { layers })
    }

    /// Single linear layer `w · x + b`
    pub fn linear(weights: [f32; FEATURE_COUNT], bias: f32) -> Self {
        let layer = DenseLayer {
            weights: Array2::from_shape_fn((FEATURE_COUNT, 1), |(i, _)| weights[i]),
            bias: Array1::from(vec![bias]),
            activation: Activation::Identity,
        };
        Self {
            layers: vec![layer],
        }
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Total number of weights and biases
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.bias.len())
            .sum()
    }

    fn forward(&self, input: ArrayView1<f32>) -> Array1<f32> {
        let mut x = input.to_owned();
        for layer in &self.layers {
            x = layer.forward(&x.view());
        }
        x
    }
}

impl Predictor for DenseNetwork {
    fn predict(&self, features: &ScaledFeatureVector) -> Result<f32, InferenceError> {
        let output = self.forward(ArrayView1::from(features.as_slice()));
        match output.first() {
            Some(value) if value.is_finite() => Ok(*value),
            Some(value) => Err(InferenceError::InferenceFailed(format!(
                "non-finite output {}",
                value
            ))),
            None => Err(InferenceError::InferenceFailed("empty output".to_string())),
        }
    }

    fn describe(&self) -> String {
        let shape: Vec<String> = std::iter::once(FEATURE_COUNT)
            .chain(self.layers.iter().map(DenseLayer::outputs))
            .map(|n| n.to_string())
            .collect();
        format!(
            "dense network {} ({} parameters)",
            shape.join(" -> "),
            self.parameter_count()
        )
    }
}
