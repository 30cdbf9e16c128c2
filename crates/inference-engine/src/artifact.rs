//! Model Artifacts
//!
//! A model artifact carries the dense network weights together with the
//! identity of the training run and the fingerprint of the scaler it was
//! fitted against. It is written as pretty JSON for inspection and as a
//! compact postcard binary for on-device runtimes. The binary form may store
//! weights as IEEE half precision.

use crate::network::{Activation, DenseLayer, DenseNetwork};
use crate::InferenceError;
use chrono::{DateTime, Utc};
use feature_scaler::ScalerArtifact;
use half::f16;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Schema tag written into every model artifact
pub const MODEL_SCHEMA: &str = "crutch-model/v1";

/// Storage precision of the weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    F32,
    F16,
}

/// Flat tensor values in storage precision. `F16` holds raw half bits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TensorData {
    F32(Vec<f32>),
    F16(Vec<u16>),
}

impl TensorData {
    pub fn encode(values: &[f32], precision: Precision) -> Self {
        match precision {
            Precision::F32 => TensorData::F32(values.to_vec()),
            Precision::F16 => {
                TensorData::F16(values.iter().map(|&v| f16::from_f32(v).to_bits()).collect())
            }
        }
    }

    pub fn to_f32(&self) -> Vec<f32> {
        match self {
            TensorData::F32(values) => values.clone(),
            TensorData::F16(bits) => bits.iter().map(|&b| f16::from_bits(b).to_f32()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TensorData::F32(values) => values.len(),
            TensorData::F16(bits) => bits.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serialized dense layer, weights row-major with shape (inputs, outputs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub inputs: u32,
    pub outputs: u32,
    pub activation: Activation,
    pub weights: TensorData,
    pub bias: TensorData,
}

impl LayerRecord {
    fn from_layer(layer: &DenseLayer, precision: Precision) -> Self {
        let weights: Vec<f32> = layer.weights().iter().copied().collect();
        let bias: Vec<f32> = layer.bias().iter().copied().collect();
        Self {
            inputs: layer.inputs() as u32,
            outputs: layer.outputs() as u32,
            activation: layer.activation(),
            weights: TensorData::encode(&weights, precision),
            bias: TensorData::encode(&bias, precision),
        }
    }

    fn to_layer(&self) -> Result<DenseLayer, InferenceError> {
        DenseLayer::from_row_major(
            self.inputs as usize,
            self.outputs as usize,
            self.weights.to_f32(),
            self.bias.to_f32(),
            self.activation,
        )
    }
}

/// Persisted predictor weights bound to one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema: String,
    pub run_id: Uuid,
    pub scaler_fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub precision: Precision,
    pub layers: Vec<LayerRecord>,
}

impl ModelArtifact {
    pub fn from_network(
        network: &DenseNetwork,
        run_id: Uuid,
        scaler_fingerprint: impl Into<String>,
        precision: Precision,
    ) -> Self {
        Self {
            schema: MODEL_SCHEMA.to_string(),
            run_id,
            scaler_fingerprint: scaler_fingerprint.into(),
            created_at: Utc::now(),
            precision,
            layers: network
                .layers()
                .iter()
                .map(|l| LayerRecord::from_layer(l, precision))
                .collect(),
        }
    }

    /// Same run and weights, re-encoded in another precision
    pub fn with_precision(&self, precision: Precision) -> Result<Self, InferenceError> {
        let network = self.to_network()?;
        let mut converted =
            Self::from_network(&network, self.run_id, self.scaler_fingerprint.clone(), precision);
        converted.created_at = self.created_at;
        Ok(converted)
    }

    pub fn validate_schema(&self) -> Result<(), InferenceError> {
        if self.schema != MODEL_SCHEMA {
            return Err(InferenceError::SchemaMismatch {
                expected: MODEL_SCHEMA,
                actual: self.schema.clone(),
            });
        }
        Ok(())
    }

    /// Rebuild the network, checking schema and layer shapes
    pub fn to_network(&self) -> Result<DenseNetwork, InferenceError> {
        self.validate_schema()?;
        let layers = self
            .layers
            .iter()
            .map(LayerRecord::to_layer)
            .collect::<Result<Vec<_>, _>>()?;
        DenseNetwork::new(layers)
    }

    /// Fail unless this model was trained together with `scaler`
    pub fn ensure_matches(&self, scaler: &ScalerArtifact) -> Result<(), InferenceError> {
        if self.scaler_fingerprint != scaler.fingerprint {
            return Err(InferenceError::ArtifactMismatch {
                field: "fingerprint",
                scaler: scaler.fingerprint.clone(),
                model: self.scaler_fingerprint.clone(),
            });
        }
        if self.run_id != scaler.run_id {
            return Err(InferenceError::ArtifactMismatch {
                field: "run_id",
                scaler: scaler.run_id.to_string(),
                model: self.run_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, InferenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate_schema()?;
        Ok(artifact)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, InferenceError> {
        Ok(postcard::to_allocvec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InferenceError> {
        let artifact: Self = postcard::from_bytes(bytes)?;
        artifact.validate_schema()?;
        Ok(artifact)
    }

    /// Write JSON for `.json` paths and postcard binary otherwise; returns bytes written
    pub fn save(&self, path: impl AsRef<Path>) -> Result<u64, InferenceError> {
        let path = path.as_ref();
        let bytes = if is_json(path) {
            self.to_json()?.into_bytes()
        } else {
            self.to_bytes()?
        };
        std::fs::write(path, &bytes)?;
        info!(
            "Saved {:?} model artifact to {} ({} bytes)",
            self.precision,
            path.display(),
            bytes.len()
        );
        Ok(bytes.len() as u64)
    }

    /// Read an artifact, choosing the format from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        debug!("Loading model artifact from {}", path.display());
        if is_json(path) {
            Self::from_json(&std::fs::read_to_string(path)?)
        } else {
            Self::from_bytes(&std::fs::read(path)?)
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
