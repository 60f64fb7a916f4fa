use crate::artifacts::ArtifactPaths;
use crate::error::{Result, SalaryError};
use crate::preprocess::CategoryPolicy;
use crate::scaler::ScalingScope;
use crate::schema::FeatureSchema;
use std::path::PathBuf;

/// Runtime settings, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub artifacts: ArtifactPaths,
    pub schema: FeatureSchema,
    pub scope: ScalingScope,
    pub policy: CategoryPolicy,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let models_root = lookup("MODELS_ROOT").unwrap_or_else(|| "../models".into());
        let model = lookup("MODEL_JSON")
            .unwrap_or_else(|| format!("{models_root}/bayesian_ridge_model.json"));
        let scaler = lookup("SCALER_JSON")
            .unwrap_or_else(|| format!("{models_root}/standard_scaler.json"));

        let schema = match lookup("FEATURE_SCHEMA") {
            Some(s) => s.parse()?,
            None => FeatureSchema::Compact,
        };
        let scope = match lookup("SCALING_SCOPE") {
            Some(s) => s.parse()?,
            None => ScalingScope::NumericOnly,
        };
        let policy = match lookup("CATEGORY_POLICY") {
            Some(s) => s.parse()?,
            None => CategoryPolicy::Strict,
        };
        let port = match lookup("PORT") {
            Some(s) => s
                .trim()
                .parse()
                .map_err(|_| SalaryError::Config(format!("invalid PORT {s:?}")))?,
            None => 8000,
        };

        Ok(Self {
            artifacts: ArtifactPaths {
                model: PathBuf::from(model),
                scaler: PathBuf::from(scaler),
            },
            schema,
            scope,
            policy,
            port,
        })
    }
}
