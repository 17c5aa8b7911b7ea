//! Two-layer graph convolutional embedding model, inference only.
//!
//! The model is a learned per-node embedding table followed by two `GCNConv`
//! layers with ReLU, matching the PyTorch-Geometric network it was trained as:
//!
//! ```text
//! x = embedding.weight
//! x = relu(conv1(x, edges))
//! x = relu(conv2(x, edges))
//! ```
//!
//! Weights come from a safetensors conversion of the trained state dict:
//! `embedding.weight`, `conv{1,2}.lin.weight` (`[out, in]`) and
//! `conv{1,2}.bias`.

use ndarray::{Array1, Array2, ArrayView2};
use safetensors::tensor::TensorView;
use safetensors::{Dtype, SafeTensors};
use thiserror::Error;

use crate::config::ModelConfig;
use crate::models::Edge;

pub const EMBEDDING_WEIGHT: &str = "embedding.weight";
pub const CONV1_WEIGHT: &str = "conv1.lin.weight";
pub const CONV1_BIAS: &str = "conv1.bias";
pub const CONV2_WEIGHT: &str = "conv2.lin.weight";
pub const CONV2_BIAS: &str = "conv2.bias";

/// Weight loading and inference errors. All of them end the run.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("GCN weights not found at {path}")]
    WeightsNotFound { path: String },

    #[error("IO error reading weights: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid safetensors data: {0}")]
    Format(String),

    #[error("Tensor {name} missing from weights file")]
    MissingTensor { name: String },

    #[error("Tensor {name} has dtype {dtype}, expected F32")]
    UnsupportedDtype { name: String, dtype: String },

    #[error("Tensor {name} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Node index {index} exceeds trained capacity of {capacity} nodes")]
    NodeOutOfRange { index: usize, capacity: usize },
}

// ============================================================================
// GcnConv
// ============================================================================

/// One graph convolution: `X' = D^-1/2 (A + I) D^-1/2 X Wᵀ + b`.
///
/// Degrees count incoming edges plus the self-loop. Messages flow from
/// `edge.src` to `edge.dst`, so an undirected graph needs both directions
/// listed to propagate both ways. Self-loops in `edges` are ignored; every
/// node already carries exactly one.
#[derive(Debug, Clone)]
pub struct GcnConv {
    /// `[out_features, in_features]`
    weight: Array2<f32>,
    /// `[out_features]`
    bias: Array1<f32>,
}

impl GcnConv {
    pub fn new(weight: Array2<f32>, bias: Array1<f32>) -> Result<Self, ModelError> {
        if bias.len() != weight.nrows() {
            return Err(ModelError::ShapeMismatch {
                name: "bias".to_string(),
                expected: vec![weight.nrows()],
                actual: vec![bias.len()],
            });
        }
        Ok(Self { weight, bias })
    }

    pub fn in_features(&self) -> usize {
        self.weight.ncols()
    }

    pub fn out_features(&self) -> usize {
        self.weight.nrows()
    }

    pub fn forward(&self, x: ArrayView2<'_, f32>, edges: &[Edge]) -> Result<Array2<f32>, ModelError> {
        let num_nodes = x.nrows();
        check_edges(edges, num_nodes)?;

        if x.ncols() != self.in_features() {
            return Err(ModelError::ShapeMismatch {
                name: "input".to_string(),
                expected: vec![num_nodes, self.in_features()],
                actual: vec![num_nodes, x.ncols()],
            });
        }

        let h = x.dot(&self.weight.t());

        let mut degree = vec![1.0f32; num_nodes];
        for edge in edges.iter().filter(|e| !e.is_self_loop()) {
            degree[edge.dst] += 1.0;
        }
        let inv_sqrt: Vec<f32> = degree.iter().map(|d| 1.0 / d.sqrt()).collect();

        let mut out = Array2::<f32>::zeros((num_nodes, self.out_features()));
        for node in 0..num_nodes {
            let norm = inv_sqrt[node] * inv_sqrt[node];
            out.row_mut(node).scaled_add(norm, &h.row(node));
        }
        for edge in edges.iter().filter(|e| !e.is_self_loop()) {
            let norm = inv_sqrt[edge.src] * inv_sqrt[edge.dst];
            out.row_mut(edge.dst).scaled_add(norm, &h.row(edge.src));
        }

        out += &self.bias;
        Ok(out)
    }
}

fn check_edges(edges: &[Edge], capacity: usize) -> Result<(), ModelError> {
    for edge in edges {
        let index = edge.src.max(edge.dst);
        if index >= capacity {
            return Err(ModelError::NodeOutOfRange { index, capacity });
        }
    }
    Ok(())
}

fn relu(mut x: Array2<f32>) -> Array2<f32> {
    x.mapv_inplace(|v| v.max(0.0));
    x
}

// ============================================================================
// GcnModel
// ============================================================================

#[derive(Debug, Clone)]
pub struct GcnModel {
    /// `[trained_num_nodes, embedding_dim]`
    embedding: Array2<f32>,
    conv1: GcnConv,
    conv2: GcnConv,
}

impl GcnModel {
    pub fn new(embedding: Array2<f32>, conv1: GcnConv, conv2: GcnConv) -> Result<Self, ModelError> {
        if conv1.in_features() != embedding.ncols() {
            return Err(ModelError::ShapeMismatch {
                name: CONV1_WEIGHT.to_string(),
                expected: vec![conv1.out_features(), embedding.ncols()],
                actual: vec![conv1.out_features(), conv1.in_features()],
            });
        }
        if conv2.in_features() != conv1.out_features() {
            return Err(ModelError::ShapeMismatch {
                name: CONV2_WEIGHT.to_string(),
                expected: vec![conv2.out_features(), conv1.out_features()],
                actual: vec![conv2.out_features(), conv2.in_features()],
            });
        }
        Ok(Self {
            embedding,
            conv1,
            conv2,
        })
    }

    /// Load weights from `config.weights_path` and check them against the
    /// configured capacity.
    pub fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        let path = config.resolved_weights_path();
        if !path.exists() {
            return Err(ModelError::WeightsNotFound {
                path: path.display().to_string(),
            });
        }

        let bytes = std::fs::read(&path)?;
        let model = Self::from_safetensors(&bytes, config)?;

        tracing::info!(
            path = %path.display(),
            nodes = model.num_nodes(),
            embedding_dim = model.embedding_dim(),
            hidden = model.hidden_channels(),
            "Loaded GCN weights"
        );

        Ok(model)
    }

    pub fn from_safetensors(bytes: &[u8], config: &ModelConfig) -> Result<Self, ModelError> {
        let tensors =
            SafeTensors::deserialize(bytes).map_err(|e| ModelError::Format(e.to_string()))?;

        let nodes = config.trained_num_nodes;
        let dim = config.embedding_dim;
        let hidden = config.hidden_channels;

        let embedding = read_matrix(&tensors, EMBEDDING_WEIGHT, (nodes, dim))?;
        let conv1 = GcnConv::new(
            read_matrix(&tensors, CONV1_WEIGHT, (hidden, dim))?,
            read_vector(&tensors, CONV1_BIAS, hidden)?,
        )?;
        let conv2 = GcnConv::new(
            read_matrix(&tensors, CONV2_WEIGHT, (hidden, hidden))?,
            read_vector(&tensors, CONV2_BIAS, hidden)?,
        )?;

        Self::new(embedding, conv1, conv2)
    }

    /// Serialize the weights in the layout [`GcnModel::from_safetensors`] reads.
    pub fn to_safetensors(&self) -> Result<Vec<u8>, ModelError> {
        let tensors = [
            (EMBEDDING_WEIGHT, self.embedding.shape().to_vec(), le_bytes(self.embedding.iter())),
            (CONV1_WEIGHT, self.conv1.weight.shape().to_vec(), le_bytes(self.conv1.weight.iter())),
            (CONV1_BIAS, self.conv1.bias.shape().to_vec(), le_bytes(self.conv1.bias.iter())),
            (CONV2_WEIGHT, self.conv2.weight.shape().to_vec(), le_bytes(self.conv2.weight.iter())),
            (CONV2_BIAS, self.conv2.bias.shape().to_vec(), le_bytes(self.conv2.bias.iter())),
        ];

        let views = tensors
            .iter()
            .map(|(name, shape, data)| {
                TensorView::new(Dtype::F32, shape.clone(), data).map(|view| (*name, view))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ModelError::Format(e.to_string()))?;

        safetensors::serialize(views, &None).map_err(|e| ModelError::Format(e.to_string()))
    }

    /// Trained node capacity.
    pub fn num_nodes(&self) -> usize {
        self.embedding.nrows()
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding.ncols()
    }

    pub fn hidden_channels(&self) -> usize {
        self.conv2.out_features()
    }

    /// One vector per trained node, `[num_nodes, hidden_channels]`.
    ///
    /// Pure function of the weights and `edges`. Every endpoint must be below
    /// [`GcnModel::num_nodes`].
    pub fn embed(&self, edges: &[Edge]) -> Result<Array2<f32>, ModelError> {
        let x = relu(self.conv1.forward(self.embedding.view(), edges)?);
        let x = relu(self.conv2.forward(x.view(), edges)?);
        Ok(x)
    }
}

fn read_f32(tensors: &SafeTensors<'_>, name: &str, expected: &[usize]) -> Result<Vec<f32>, ModelError> {
    let view = tensors.tensor(name).map_err(|_| ModelError::MissingTensor {
        name: name.to_string(),
    })?;

    if view.dtype() != Dtype::F32 {
        return Err(ModelError::UnsupportedDtype {
            name: name.to_string(),
            dtype: format!("{:?}", view.dtype()),
        });
    }
    if view.shape() != expected {
        return Err(ModelError::ShapeMismatch {
            name: name.to_string(),
            expected: expected.to_vec(),
            actual: view.shape().to_vec(),
        });
    }

    Ok(view
        .data()
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn read_matrix(
    tensors: &SafeTensors<'_>,
    name: &str,
    (rows, cols): (usize, usize),
) -> Result<Array2<f32>, ModelError> {
    let data = read_f32(tensors, name, &[rows, cols])?;
    Array2::from_shape_vec((rows, cols), data).map_err(|e| ModelError::Format(e.to_string()))
}

fn read_vector(tensors: &SafeTensors<'_>, name: &str, len: usize) -> Result<Array1<f32>, ModelError> {
    Ok(Array1::from_vec(read_f32(tensors, name, &[len])?))
}

fn le_bytes<'a>(values: impl Iterator<Item = &'a f32>) -> Vec<u8> {
    values.flat_map(|v| v.to_le_bytes()).collect()
}

// ============================================================================
// TESTS
// ============================================================================
