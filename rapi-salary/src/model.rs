use crate::error::{Result, SalaryError};
use crate::schema::FeatureSchema;
use async_trait::async_trait;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One participant as entered in the form.
///
/// Omitted fields fall back to the form's initial widget values. The
/// training frame's column names are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputData {
    #[serde(default = "default_age", alias = "Usia")]
    pub age: i64,
    #[serde(default = "default_training_hours", alias = "Durasi_Jam")]
    pub training_hours: i64,
    #[serde(default = "default_exam_score", alias = "Nilai_Ujian")]
    pub exam_score: f64,
    #[serde(default = "default_gender", alias = "Jenis_Kelamin")]
    pub gender: String,
    #[serde(default = "default_employment_status", alias = "Status_Bekerja")]
    pub employment_status: String,
    #[serde(default, alias = "Jurusan")]
    pub major: Option<String>,
}

fn default_age() -> i64 {
    25
}

fn default_training_hours() -> i64 {
    60
}

fn default_exam_score() -> f64 {
    75.0
}

fn default_gender() -> String {
    "Laki-laki".into()
}

fn default_employment_status() -> String {
    "Sudah Bekerja".into()
}

impl Default for InputData {
    fn default() -> Self {
        Self {
            age: default_age(),
            training_hours: default_training_hours(),
            exam_score: default_exam_score(),
            gender: default_gender(),
            employment_status: default_employment_status(),
            major: None,
        }
    }
}

impl InputData {
    /// Enforces the bounds of the form's sliders.
    pub fn validate(&self) -> Result<()> {
        if !(18..=60).contains(&self.age) {
            return Err(SalaryError::InvalidInput {
                field: "age",
                value: self.age.to_string(),
                range: "[18, 60]",
            });
        }
        if !(20..=100).contains(&self.training_hours) {
            return Err(SalaryError::InvalidInput {
                field: "training_hours",
                value: self.training_hours.to_string(),
                range: "[20, 100]",
            });
        }
        if !(50.0..=100.0).contains(&self.exam_score) {
            return Err(SalaryError::InvalidInput {
                field: "exam_score",
                value: self.exam_score.to_string(),
                range: "[50.0, 100.0]",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResp {
    pub prediction: f64,
    pub display: String,
}

impl PredictResp {
    pub fn new(prediction: f64) -> Self {
        Self {
            prediction,
            display: display_salary(prediction),
        }
    }
}

/// Salary in millions of rupiah, as shown to the user.
pub fn display_salary(y: f64) -> String {
    format!("{y:.2} Juta Rupiah")
}

/// Describes the deployed model for the info endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub kind: String,
    pub schema: FeatureSchema,
    pub scaled_columns: Vec<String>,
}

#[async_trait]
pub trait Model: Send + Sync {
    async fn predict(&self, x: &InputData) -> Result<f64>;

    fn info(&self) -> ModelInfo;
}

pub type DynModel = Arc<dyn Model>;

/// Fitted affine regressor: `intercept + coefficients · x`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub kind: String,
    pub intercept: f64,
    pub coefficients: Array1<f64>,
    pub feature_names: Option<Vec<String>>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            kind: "BayesianRidge".into(),
            intercept,
            coefficients: Array1::from(coefficients),
            feature_names: None,
        }
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn predict(&self, x: &Array1<f64>) -> Result<f64> {
        if x.len() != self.coefficients.len() {
            return Err(SalaryError::DimensionMismatch {
                context: "model input",
                expected: self.coefficients.len(),
                actual: x.len(),
            });
        }
        Ok(self.intercept + self.coefficients.dot(x))
    }
}
