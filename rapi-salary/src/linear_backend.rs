use crate::artifacts::Artifacts;
use crate::error::Result;
use crate::model::{InputData, Model, ModelInfo};
use crate::preprocess::{CategoryPolicy, FeatureEncoder};
use crate::scaler::{column_indices, ScalingScope};
use crate::schema::FeatureSchema;
use async_trait::async_trait;
use std::sync::Arc;

/// Linear regression backend: encode → scale → predict, all in memory.
pub struct LinearBackend {
    artifacts: Arc<Artifacts>,
    encoder: FeatureEncoder,
    scope: ScalingScope,
    scaled: Vec<usize>,
}

impl LinearBackend {
    pub fn new(
        artifacts: Arc<Artifacts>,
        schema: FeatureSchema,
        scope: ScalingScope,
        policy: CategoryPolicy,
    ) -> Result<Self> {
        let scaled = column_indices(schema, scope.columns(schema))?;
        Ok(Self {
            artifacts,
            encoder: FeatureEncoder::new(schema, policy),
            scope,
            scaled,
        })
    }

    /// Runs the full pipeline synchronously.
    pub fn predict_one(&self, x: &InputData) -> Result<f64> {
        x.validate()?;
        let encoded = self.encoder.encode(x)?;
        let scaled = self.artifacts.scaler.transform(&encoded, &self.scaled)?;
        let y = self.artifacts.model.predict(&scaled)?;
        tracing::debug!(?encoded, ?scaled, prediction = y, "predicted");
        Ok(y)
    }
}

#[async_trait]
impl Model for LinearBackend {
    async fn predict(&self, x: &InputData) -> Result<f64> {
        self.predict_one(x)
    }

    fn info(&self) -> ModelInfo {
        let schema = self.encoder.schema();
        ModelInfo {
            kind: self.artifacts.model.kind.clone(),
            schema,
            scaled_columns: self
                .scope
                .columns(schema)
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}
