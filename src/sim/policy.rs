//! Feed-forward network policy for AI drivers
//!
//! Inference only. Weights come from an external parameter blob and are
//! validated against the declared shape before any car is created.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Element-wise (or segment-wise, for softmax) activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Relu,
    Tanh,
    Sigmoid,
    Softmax,
    Linear,
}

impl Activation {
    /// Apply in place to a slice of pre-activations
    pub fn apply(&self, values: &mut [f32]) {
        match self {
            Activation::Relu => values.iter_mut().for_each(|v| *v = v.max(0.0)),
            Activation::Tanh => values.iter_mut().for_each(|v| *v = v.tanh()),
            Activation::Sigmoid => values.iter_mut().for_each(|v| *v = 1.0 / (1.0 + (-*v).exp())),
            Activation::Linear => {}
            Activation::Softmax => {
                let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let mut sum = 0.0;
                for v in values.iter_mut() {
                    *v = (*v - max).exp();
                    sum += *v;
                }
                if sum > 0.0 {
                    values.iter_mut().for_each(|v| *v /= sum);
                }
            }
        }
    }
}

/// Declared network layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkShape {
    pub input_size: usize,
    pub output_size: usize,
    pub hidden_layers: usize,
    pub hidden_neurons: usize,
    pub hidden_activation: Activation,
    /// Output head split into activation segments, e.g. softmax(3) + tanh(1)
    pub output_activations: Vec<(Activation, usize)>,
}

impl Default for NetworkShape {
    fn default() -> Self {
        Self {
            input_size: 10,
            output_size: 4,
            hidden_layers: 2,
            hidden_neurons: 64,
            hidden_activation: Activation::Relu,
            output_activations: vec![(Activation::Softmax, 3), (Activation::Tanh, 1)],
        }
    }
}

impl NetworkShape {
    /// (inputs, outputs) of every dense layer in order
    pub fn layer_dims(&self) -> Vec<(usize, usize)> {
        let mut dims = Vec::with_capacity(self.hidden_layers + 1);
        let mut prev = self.input_size;
        for _ in 0..self.hidden_layers {
            dims.push((prev, self.hidden_neurons));
            prev = self.hidden_neurons;
        }
        dims.push((prev, self.output_size));
        dims
    }
}

/// Serialized weights of one dense layer.
///
/// `weights[i][j]` connects input `i` to output `j` (`y = x·W + b`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerParams {
    pub weights: Vec<Vec<f32>>,
    pub biases: Vec<f32>,
}

/// Externally persisted parameter blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyParams {
    pub layers: Vec<LayerParams>,
}

impl PolicyParams {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[derive(Debug, Clone)]
struct DenseLayer {
    inputs: usize,
    outputs: usize,
    /// Row-major `inputs x outputs`
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl DenseLayer {
    fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut out = self.biases.clone();
        for (i, &x) in input.iter().enumerate().take(self.inputs) {
            if x == 0.0 {
                continue;
            }
            let row = &self.weights[i * self.outputs..(i + 1) * self.outputs];
            for (o, w) in out.iter_mut().zip(row) {
                *o += x * w;
            }
        }
        out
    }
}

/// Immutable, validated policy network
#[derive(Debug, Clone)]
pub struct Policy {
    shape: NetworkShape,
    layers: Vec<DenseLayer>,
}

impl Policy {
    /// Validate `params` against `shape` and build the network
    pub fn new(shape: NetworkShape, params: &PolicyParams) -> Result<Self, ConfigError> {
        let head_total: usize = shape.output_activations.iter().map(|(_, n)| n).sum();
        let dims = shape.layer_dims();
        if head_total != shape.output_size {
            return Err(ConfigError::NetworkShape {
                layer: dims.len() - 1,
                detail: format!(
                    "output activations cover {head_total} values, output size is {}",
                    shape.output_size
                ),
            });
        }
        if params.layers.len() != dims.len() {
            return Err(ConfigError::NetworkShape {
                layer: params.layers.len().min(dims.len()),
                detail: format!("expected {} layers, got {}", dims.len(), params.layers.len()),
            });
        }

        let mut layers = Vec::with_capacity(dims.len());
        for (index, ((inputs, outputs), layer)) in dims.iter().zip(&params.layers).enumerate() {
            if layer.weights.len() != *inputs {
                return Err(ConfigError::NetworkShape {
                    layer: index,
                    detail: format!("expected {inputs} weight rows, got {}", layer.weights.len()),
                });
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != *outputs) {
                return Err(ConfigError::NetworkShape {
                    layer: index,
                    detail: format!("expected {outputs} weights per row, got {}", row.len()),
                });
            }
            if layer.biases.len() != *outputs {
                return Err(ConfigError::NetworkShape {
                    layer: index,
                    detail: format!("expected {outputs} biases, got {}", layer.biases.len()),
                });
            }
            let flat: Vec<f32> = layer.weights.iter().flatten().copied().collect();
            if flat.iter().chain(&layer.biases).any(|v| !v.is_finite()) {
                return Err(ConfigError::NetworkShape {
                    layer: index,
                    detail: "non-finite parameter".to_string(),
                });
            }
            layers.push(DenseLayer {
                inputs: *inputs,
                outputs: *outputs,
                weights: flat,
                biases: layer.biases.clone(),
            });
        }

        log::debug!("Policy loaded: {:?}", dims);
        Ok(Self { shape, layers })
    }

    /// Parse a JSON blob and validate it
    pub fn from_json(shape: NetworkShape, json: &str) -> Result<Self, ConfigError> {
        Self::new(shape, &PolicyParams::from_json(json)?)
    }

    /// Uniformly initialised network (Xavier range) for untrained drivers
    pub fn random<R: Rng>(shape: NetworkShape, rng: &mut R) -> Result<Self, ConfigError> {
        let layers = shape
            .layer_dims()
            .into_iter()
            .map(|(inputs, outputs)| {
                let limit = (6.0 / (inputs + outputs).max(1) as f32).sqrt();
                LayerParams {
                    weights: (0..inputs)
                        .map(|_| (0..outputs).map(|_| rng.random_range(-limit..=limit)).collect())
                        .collect(),
                    biases: vec![0.0; outputs],
                }
            })
            .collect();
        Self::new(shape, &PolicyParams { layers })
    }

    pub fn shape(&self) -> &NetworkShape {
        &self.shape
    }

    pub fn input_size(&self) -> usize {
        self.shape.input_size
    }

    /// Run one forward pass
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        debug_assert_eq!(input.len(), self.shape.input_size);

        let last = self.layers.len() - 1;
        let mut x = input.to_vec();
        for (index, layer) in self.layers.iter().enumerate() {
            x = layer.forward(&x);
            if index < last {
                self.shape.hidden_activation.apply(&mut x);
            }
        }

        let mut offset = 0;
        for (activation, len) in &self.shape.output_activations {
            activation.apply(&mut x[offset..offset + len]);
            offset += len;
        }
        x
    }
}
