use crate::error::{Result, SalaryError};
use crate::schema::{FeatureSchema, NUMERIC_COLUMNS};
use ndarray::Array1;
use std::str::FromStr;

/// Which columns of the encoded vector go through the fitted scaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingScope {
    /// Only age, training hours and exam score. Indicators pass through.
    NumericOnly,
    /// Every column, indicators included. Requires a scaler fitted on the
    /// full encoded frame.
    AllColumns,
}

impl ScalingScope {
    pub fn columns(&self, schema: FeatureSchema) -> &'static [&'static str] {
        match self {
            ScalingScope::NumericOnly => &NUMERIC_COLUMNS,
            ScalingScope::AllColumns => schema.columns(),
        }
    }
}

impl FromStr for ScalingScope {
    type Err = SalaryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "numeric" | "numeric_only" => Ok(ScalingScope::NumericOnly),
            "all" | "all_columns" => Ok(ScalingScope::AllColumns),
            other => Err(SalaryError::Config(format!(
                "unknown scaling scope {other:?}, expected numeric or all"
            ))),
        }
    }
}

/// Fitted standardization parameters: `(x - mean) / scale` per column.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    pub scale: Array1<f64>,
    pub feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    /// Zero scales are replaced by 1.0 so constant columns only get centered.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(SalaryError::DimensionMismatch {
                context: "scaler parameters",
                expected: mean.len(),
                actual: scale.len(),
            });
        }
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect::<Vec<_>>();
        Ok(Self {
            mean: Array1::from(mean),
            scale: Array1::from(scale),
            feature_names: None,
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Returns a copy of `x` with the columns at `indices` standardized.
    /// `indices[j]` is scaled with the j-th fitted parameter pair.
    pub fn transform(&self, x: &Array1<f64>, indices: &[usize]) -> Result<Array1<f64>> {
        self.check(x, indices)?;
        let mut out = x.clone();
        for (j, &i) in indices.iter().enumerate() {
            out[i] = (x[i] - self.mean[j]) / self.scale[j];
        }
        Ok(out)
    }

    pub fn inverse_transform(&self, x: &Array1<f64>, indices: &[usize]) -> Result<Array1<f64>> {
        self.check(x, indices)?;
        let mut out = x.clone();
        for (j, &i) in indices.iter().enumerate() {
            out[i] = x[i] * self.scale[j] + self.mean[j];
        }
        Ok(out)
    }

    fn check(&self, x: &Array1<f64>, indices: &[usize]) -> Result<()> {
        if indices.len() != self.n_features() {
            return Err(SalaryError::DimensionMismatch {
                context: "scaler input",
                expected: self.n_features(),
                actual: indices.len(),
            });
        }
        if let Some(&max) = indices.iter().max() {
            if max >= x.len() {
                return Err(SalaryError::DimensionMismatch {
                    context: "scaler input",
                    expected: max + 1,
                    actual: x.len(),
                });
            }
        }
        Ok(())
    }
}

/// Positions of `columns` inside `schema`, or a schema mismatch naming the
/// columns the schema lacks.
pub fn column_indices(schema: FeatureSchema, columns: &[&str]) -> Result<Vec<usize>> {
    let mut indices = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();
    for c in columns {
        match schema.index_of(c) {
            Some(i) => indices.push(i),
            None => missing.push(c.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(SalaryError::SchemaMismatch {
            context: "scaler",
            missing,
            unexpected: Vec::new(),
        });
    }
    Ok(indices)
}
