//! Ranking model
//!
//! A ranking model maps a user vector and a batch of recipe feature rows to
//! one relevance score per row. Inference returns a `Result` so callers can
//! decide how to degrade; see [`ScoringEngine`](super::scoring::ScoringEngine).
//!
//! The shipped implementation is a small feed-forward network whose weights
//! are read from JSON:
//!
//! ```json
//! {
//!   "user_dim": 13,
//!   "recipe_dim": 16,
//!   "layers": [
//!     { "weights": [[0.1, ...], ...], "bias": [0.0, ...] },
//!     { "weights": [[0.3], ...], "bias": [0.0] }
//!   ]
//! }
//! ```
//!
//! `weights` is row-major `inputs x outputs`. The input of the first layer is
//! the user vector followed by the recipe row. Hidden layers use ReLU; the
//! last layer has a single linear output.

use ndarray::{concatenate, Array1, Array2, ArrayView2, Axis};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Model loading and inference errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("No ranking model is loaded")]
    Unavailable,

    #[error("Model file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model shape: {0}")]
    Shape(String),

    #[error("Input dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model produced {actual} scores for {expected} recipes")]
    OutputLength { expected: usize, actual: usize },
}

/// A `(user, recipe) -> score` function evaluated over a batch of recipes
pub trait RankingModel: Send + Sync {
    /// Expected user vector length
    fn user_dim(&self) -> usize;

    /// Expected recipe feature row length
    fn recipe_dim(&self) -> usize;

    /// Score every row of `recipes` for `user`, in row order
    fn score_batch(&self, user: &[f32], recipes: ArrayView2<'_, f32>) -> Result<Vec<f32>, ModelError>;
}

// ============================================================================
// Feed-forward network
// ============================================================================

/// Fully connected layer
#[derive(Debug, Clone)]
pub struct DenseLayer {
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl DenseLayer {
    pub fn new(weights: Array2<f32>, bias: Array1<f32>) -> Result<Self, ModelError> {
        if weights.ncols() != bias.len() {
            return Err(ModelError::Shape(format!(
                "bias has {} values for {} outputs",
                bias.len(),
                weights.ncols()
            )));
        }
        Ok(Self { weights, bias })
    }

    pub fn inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn outputs(&self) -> usize {
        self.weights.ncols()
    }
}

/// Multi-layer perceptron ranker
#[derive(Debug, Clone)]
pub struct MlpRanker {
    user_dim: usize,
    recipe_dim: usize,
    layers: Vec<DenseLayer>,
}

#[derive(Deserialize)]
struct ModelFile {
    user_dim: usize,
    recipe_dim: usize,
    layers: Vec<LayerFile>,
}

#[derive(Deserialize)]
struct LayerFile {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl LayerFile {
    fn into_layer(self) -> Result<DenseLayer, ModelError> {
        let rows = self.weights.len();
        let cols = self.weights.first().map(Vec::len).unwrap_or(0);
        if self.weights.iter().any(|row| row.len() != cols) {
            return Err(ModelError::Shape("weight rows have different lengths".to_string()));
        }
        let flat: Vec<f32> = self.weights.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| ModelError::Shape(e.to_string()))?;
        DenseLayer::new(weights, Array1::from(self.bias))
    }
}

impl MlpRanker {
    /// Assemble a network, checking that layer shapes chain together
    pub fn new(user_dim: usize, recipe_dim: usize, layers: Vec<DenseLayer>) -> Result<Self, ModelError> {
        let Some(first) = layers.first() else {
            return Err(ModelError::Shape("model has no layers".to_string()));
        };
        if first.inputs() != user_dim + recipe_dim {
            return Err(ModelError::DimensionMismatch {
                expected: user_dim + recipe_dim,
                actual: first.inputs(),
            });
        }
        for pair in layers.windows(2) {
            if pair[0].outputs() != pair[1].inputs() {
                return Err(ModelError::Shape(format!(
                    "layer with {} outputs feeds a layer with {} inputs",
                    pair[0].outputs(),
                    pair[1].inputs()
                )));
            }
        }
        if let Some(last) = layers.last().filter(|l| l.outputs() != 1) {
            return Err(ModelError::Shape(format!(
                "last layer must have 1 output, has {}",
                last.outputs()
            )));
        }

        Ok(Self {
            user_dim,
            recipe_dim,
            layers,
        })
    }

    /// Load weights from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Load weights from any JSON reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        let file: ModelFile = serde_json::from_reader(reader)?;
        let layers = file
            .layers
            .into_iter()
            .map(LayerFile::into_layer)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(file.user_dim, file.recipe_dim, layers)
    }
}

impl RankingModel for MlpRanker {
    fn user_dim(&self) -> usize {
        self.user_dim
    }

    fn recipe_dim(&self) -> usize {
        self.recipe_dim
    }

    fn score_batch(&self, user: &[f32], recipes: ArrayView2<'_, f32>) -> Result<Vec<f32>, ModelError> {
        if user.len() != self.user_dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.user_dim,
                actual: user.len(),
            });
        }
        if recipes.ncols() != self.recipe_dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.recipe_dim,
                actual: recipes.ncols(),
            });
        }

        let n = recipes.nrows();
        // same user vector on every row
        let users = Array2::from_shape_fn((n, self.user_dim), |(_, j)| user[j]);
        let mut x = concatenate(Axis(1), &[users.view(), recipes.view()])
            .map_err(|e| ModelError::Shape(e.to_string()))?;

        let hidden = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate() {
            x = x.dot(&layer.weights) + &layer.bias;
            if i < hidden {
                x.mapv_inplace(|v| v.max(0.0));
            }
        }

        let scores = x.column(0).to_vec();
        if scores.len() != n {
            return Err(ModelError::OutputLength {
                expected: n,
                actual: scores.len(),
            });
        }
        Ok(scores)
    }
}
