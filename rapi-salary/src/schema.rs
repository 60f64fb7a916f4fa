//! Feature schemas the regression artifacts were fitted against.
//!
//! Column names and order come from the training notebook's one-hot frame and
//! must stay in lockstep with the model and scaler artifacts. The scaler and
//! the model never see column names at inference time, so a reordered schema
//! produces wrong salaries instead of an error.

use crate::error::SalaryError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const AGE: &str = "Usia";
pub const TRAINING_HOURS: &str = "Durasi_Jam";
pub const EXAM_SCORE: &str = "Nilai_Ujian";

/// Raw numeric inputs, in the order the scaler was fitted on.
pub const NUMERIC_COLUMNS: [&str; 3] = [AGE, TRAINING_HOURS, EXAM_SCORE];

pub const GENDER_PREFIX: &str = "Jenis_Kelamin_";
pub const STATUS_PREFIX: &str = "Status_Bekerja_";
pub const MAJOR_PREFIX: &str = "Jurusan_";

pub const GENDER_CATEGORIES: [&str; 2] = ["Laki-laki", "Wanita"];
pub const STATUS_CATEGORIES: [&str; 2] = ["Belum Bekerja", "Sudah Bekerja"];
pub const MAJOR_CATEGORIES: [&str; 5] = ["Bisnis", "IT", "Kesehatan", "Seni", "Teknik"];

const COMPACT_COLUMNS: [&str; 7] = [
    AGE,
    TRAINING_HOURS,
    EXAM_SCORE,
    "Jenis_Kelamin_Laki-laki",
    "Jenis_Kelamin_Wanita",
    "Status_Bekerja_Belum Bekerja",
    "Status_Bekerja_Sudah Bekerja",
];

const EXTENDED_COLUMNS: [&str; 12] = [
    AGE,
    TRAINING_HOURS,
    EXAM_SCORE,
    "Jenis_Kelamin_Laki-laki",
    "Jenis_Kelamin_Wanita",
    "Status_Bekerja_Belum Bekerja",
    "Status_Bekerja_Sudah Bekerja",
    "Jurusan_Bisnis",
    "Jurusan_IT",
    "Jurusan_Kesehatan",
    "Jurusan_Seni",
    "Jurusan_Teknik",
];

/// Which trained artifact pair is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSchema {
    /// Age, hours, score, gender and employment status.
    Compact,
    /// Compact plus five one-hot major columns.
    Extended,
}

impl FeatureSchema {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            FeatureSchema::Compact => &COMPACT_COLUMNS,
            FeatureSchema::Extended => &EXTENDED_COLUMNS,
        }
    }

    pub fn len(&self) -> usize {
        self.columns().len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }

    pub fn has_major(&self) -> bool {
        matches!(self, FeatureSchema::Extended)
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns().iter().position(|c| *c == column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index_of(column).is_some()
    }

    pub fn name(&self) -> &'static str {
        match self {
            FeatureSchema::Compact => "compact",
            FeatureSchema::Extended => "extended",
        }
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureSchema {
    type Err = SalaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "7" => Ok(FeatureSchema::Compact),
            "extended" | "12" => Ok(FeatureSchema::Extended),
            other => Err(SalaryError::Config(format!(
                "unknown feature schema {other:?}, expected compact or extended"
            ))),
        }
    }
}

/// Builds the indicator column name for a category, e.g. `Jurusan_IT`.
pub fn indicator(prefix: &str, category: &str) -> String {
    format!("{prefix}{category}")
}
