//! Loading of the fitted model and scaler.
//!
//! Both artifacts are JSON exports of the training run. They are read once,
//! validated, and then shared read-only behind an `Arc` for the rest of the
//! process.

use crate::error::{Result, SalaryError};
use crate::model::LinearModel;
use crate::scaler::{ScalingScope, StandardScaler};
use crate::schema::FeatureSchema;
use ndarray::Array1;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Deserialize)]
struct ModelFile {
    intercept: f64,
    coefficients: Vec<f64>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ScalerFile {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
}

/// The fitted pair a prediction needs.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub model: LinearModel,
    pub scaler: StandardScaler,
}

impl Artifacts {
    pub async fn load(paths: &ArtifactPaths) -> Result<Self> {
        let model = load_model(&paths.model).await?;
        let scaler = load_scaler(&paths.scaler).await?;
        tracing::info!(
            model = %paths.model.display(),
            scaler = %paths.scaler.display(),
            kind = %model.kind,
            coefficients = model.n_features(),
            scaled = scaler.n_features(),
            "artifacts loaded"
        );
        Ok(Self { model, scaler })
    }

    /// Checks the feature names recorded at fit time, if any, against the
    /// columns this process will feed the model and the scaler.
    pub fn check_schema(&self, schema: FeatureSchema, scope: ScalingScope) -> Result<()> {
        if let Some(names) = &self.model.feature_names {
            compare_names("model", schema.columns(), names)?;
        }
        if let Some(names) = &self.scaler.feature_names {
            compare_names("scaler", scope.columns(schema), names)?;
        }
        Ok(())
    }

    /// Dimension problems that will make every request fail.
    pub fn dimension_warnings(&self, schema: FeatureSchema, scope: ScalingScope) -> Vec<String> {
        let mut out = Vec::new();
        if self.model.n_features() != schema.len() {
            out.push(format!(
                "model has {} coefficients but the {schema} schema has {} columns",
                self.model.n_features(),
                schema.len()
            ));
        }
        let scaled = scope.columns(schema).len();
        if self.scaler.n_features() != scaled {
            out.push(format!(
                "scaler was fitted on {} columns but {scaled} are scaled",
                self.scaler.n_features()
            ));
        }
        out
    }
}

/// Memoizes the artifact load. Concurrent first calls share a single load;
/// a failed load is not cached.
#[derive(Debug)]
pub struct ArtifactStore {
    paths: ArtifactPaths,
    cell: OnceCell<Arc<Artifacts>>,
}

impl ArtifactStore {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<Arc<Artifacts>> {
        self.cell
            .get_or_try_init(|| async { Artifacts::load(&self.paths).await.map(Arc::new) })
            .await
            .map(Arc::clone)
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => SalaryError::ResourceNotFound {
            path: path.to_path_buf(),
        },
        _ => corrupt(path, e),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| corrupt(path, e))
}

async fn load_model(path: &Path) -> Result<LinearModel> {
    let file: ModelFile = read_json(path).await?;
    if file.coefficients.is_empty() {
        return Err(corrupt(path, "model has no coefficients"));
    }
    if !file.intercept.is_finite() || file.coefficients.iter().any(|c| !c.is_finite()) {
        return Err(corrupt(path, "model parameters must be finite"));
    }
    if let Some(names) = &file.feature_names {
        if names.len() != file.coefficients.len() {
            return Err(corrupt(
                path,
                format!(
                    "{} feature names for {} coefficients",
                    names.len(),
                    file.coefficients.len()
                ),
            ));
        }
    }
    Ok(LinearModel {
        kind: file.kind.unwrap_or_else(|| "BayesianRidge".into()),
        intercept: file.intercept,
        coefficients: Array1::from(file.coefficients),
        feature_names: file.feature_names,
    })
}

async fn load_scaler(path: &Path) -> Result<StandardScaler> {
    let file: ScalerFile = read_json(path).await?;
    if file.mean.is_empty() {
        return Err(corrupt(path, "scaler has no parameters"));
    }
    if file.mean.iter().chain(&file.scale).any(|v| !v.is_finite()) {
        return Err(corrupt(path, "scaler parameters must be finite"));
    }
    if let Some(names) = &file.feature_names {
        if names.len() != file.mean.len() {
            return Err(corrupt(
                path,
                format!("{} feature names for {} means", names.len(), file.mean.len()),
            ));
        }
    }
    let mut scaler = StandardScaler::new(file.mean, file.scale).map_err(|e| corrupt(path, e))?;
    scaler.feature_names = file.feature_names;
    Ok(scaler)
}

fn corrupt(path: &Path, reason: impl ToString) -> SalaryError {
    SalaryError::ResourceCorrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn compare_names(context: &'static str, expected: &[&str], found: &[String]) -> Result<()> {
    if expected.iter().copied().eq(found.iter().map(String::as_str)) {
        return Ok(());
    }
    let missing: Vec<String> = expected
        .iter()
        .filter(|c| !found.iter().any(|f| f == *c))
        .map(|c| c.to_string())
        .collect();
    let unexpected: Vec<String> = found
        .iter()
        .filter(|f| !expected.contains(&f.as_str()))
        .cloned()
        .collect();
    if missing.is_empty() && unexpected.is_empty() {
        return Err(SalaryError::ColumnOrder {
            context,
            expected: expected.iter().map(|c| c.to_string()).collect(),
            found: found.to_vec(),
        });
    }
    Err(SalaryError::SchemaMismatch {
        context,
        missing,
        unexpected,
    })
}
