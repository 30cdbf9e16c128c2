//! Persisted Scaler Artifact

use crate::error::ScalerError;
use crate::features::{FEATURE_COUNT, FEATURE_NAMES};
use crate::scaler::ScalerParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Schema tag written into every scaler artifact
pub const SCALER_SCHEMA: &str = "crutch-scaler/v1";

/// On-disk form of [`ScalerParams`], tagged with the training run that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub schema: String,
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub feature_names: [String; FEATURE_COUNT],
    pub data_min: [f32; FEATURE_COUNT],
    pub data_max: [f32; FEATURE_COUNT],
    pub fingerprint: String,
}

impl ScalerArtifact {
    /// Wrap fitted params for the given training run
    pub fn new(params: &ScalerParams, run_id: Uuid) -> Self {
        Self {
            schema: SCALER_SCHEMA.to_string(),
            run_id,
            created_at: Utc::now(),
            feature_names: FEATURE_NAMES.map(str::to_string),
            data_min: *params.data_min(),
            data_max: *params.data_max(),
            fingerprint: params.fingerprint(),
        }
    }

    /// Check schema tag, feature order, bounds, and fingerprint
    pub fn validate(&self) -> Result<ScalerParams, ScalerError> {
        if self.schema != SCALER_SCHEMA {
            return Err(ScalerError::SchemaMismatch {
                expected: SCALER_SCHEMA,
                actual: self.schema.clone(),
            });
        }

        for (position, (actual, expected)) in
            self.feature_names.iter().zip(FEATURE_NAMES).enumerate()
        {
            if actual != expected {
                return Err(ScalerError::FeatureOrder {
                    position,
                    expected,
                    actual: actual.clone(),
                });
            }
        }

        let params = ScalerParams::new(self.data_min, self.data_max)?;
        let computed = params.fingerprint();
        if computed != self.fingerprint {
            return Err(ScalerError::FingerprintMismatch {
                stored: self.fingerprint.clone(),
                computed,
            });
        }

        Ok(params)
    }

    /// Parse and validate an artifact from JSON text
    pub fn from_json(json: &str) -> Result<Self, ScalerError> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn to_json(&self) -> Result<String, ScalerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the artifact as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScalerError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        info!("Saved scaler artifact to {}", path.display());
        Ok(())
    }

    /// Read and validate an artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScalerError> {
        let path = path.as_ref();
        debug!("Loading scaler artifact from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
