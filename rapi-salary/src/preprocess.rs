use crate::error::{Result, SalaryError};
use crate::model::InputData;
use crate::schema::{
    self, FeatureSchema, GENDER_CATEGORIES, GENDER_PREFIX, MAJOR_CATEGORIES, MAJOR_PREFIX,
    STATUS_CATEGORIES, STATUS_PREFIX,
};
use ndarray::Array1;
use std::str::FromStr;

/// Raw gender labels seen in the training data, mapped to the two labels the
/// one-hot columns were built from.
const GENDER_ALIASES: [(&str, &str); 8] = [
    ("Laki-laki", "Laki-laki"),
    ("Wanita", "Wanita"),
    ("Pria", "Laki-laki"),
    ("L", "Laki-laki"),
    ("Laki-Laki", "Laki-laki"),
    ("Perempuan", "Wanita"),
    ("P", "Wanita"),
    ("wanita", "Wanita"),
];

/// Maps a raw gender label to its canonical form. Unknown labels come back
/// untouched; the encoder decides what to do with them.
pub fn normalize_gender(raw: &str) -> &str {
    GENDER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(raw)
}

/// What to do with a category value that has no indicator column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryPolicy {
    /// Reject the request with `UnrecognizedCategory`.
    Strict,
    /// Leave every indicator of the group at 0.
    Lenient,
}

impl FromStr for CategoryPolicy {
    type Err = SalaryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(CategoryPolicy::Strict),
            "lenient" => Ok(CategoryPolicy::Lenient),
            other => Err(SalaryError::Config(format!(
                "unknown category policy {other:?}, expected strict or lenient"
            ))),
        }
    }
}

/// One-hot encoder producing vectors in schema order.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder {
    schema: FeatureSchema,
    policy: CategoryPolicy,
}

impl FeatureEncoder {
    pub fn new(schema: FeatureSchema, policy: CategoryPolicy) -> Self {
        Self { schema, policy }
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    /// Encodes one input row. Numeric columns are written unscaled.
    pub fn encode(&self, x: &InputData) -> Result<Array1<f64>> {
        // working frame: numerics first, then every dummy column at 0
        let mut working: Vec<(String, f64)> = vec![
            (schema::AGE.to_string(), x.age as f64),
            (schema::TRAINING_HOURS.to_string(), x.training_hours as f64),
            (schema::EXAM_SCORE.to_string(), x.exam_score),
        ];
        push_dummies(&mut working, GENDER_PREFIX, &GENDER_CATEGORIES);
        push_dummies(&mut working, STATUS_PREFIX, &STATUS_CATEGORIES);
        if self.schema.has_major() {
            push_dummies(&mut working, MAJOR_PREFIX, &MAJOR_CATEGORIES);
        }

        let gender = normalize_gender(&x.gender);
        self.set_indicator(&mut working, "gender", GENDER_PREFIX, gender)?;
        self.set_indicator(
            &mut working,
            "employment status",
            STATUS_PREFIX,
            &x.employment_status,
        )?;
        if self.schema.has_major() {
            let major = x.major.as_deref().unwrap_or_default();
            self.set_indicator(&mut working, "major", MAJOR_PREFIX, major)?;
        }

        reorder_to_schema(working, self.schema)
    }

    fn set_indicator(
        &self,
        working: &mut [(String, f64)],
        field: &'static str,
        prefix: &str,
        value: &str,
    ) -> Result<()> {
        let column = schema::indicator(prefix, value);
        match working.iter_mut().find(|(name, _)| *name == column) {
            Some((_, v)) => {
                *v = 1.0;
                Ok(())
            }
            None => match self.policy {
                CategoryPolicy::Strict => Err(SalaryError::UnrecognizedCategory {
                    field,
                    value: value.to_string(),
                }),
                CategoryPolicy::Lenient => {
                    tracing::debug!(field, value, "unrecognized category, indicators left at 0");
                    Ok(())
                }
            },
        }
    }
}

fn push_dummies(working: &mut Vec<(String, f64)>, prefix: &str, categories: &[&str]) {
    working.extend(
        categories
            .iter()
            .map(|c| (schema::indicator(prefix, c), 0.0)),
    );
}

/// Lays named columns out in schema order. The column set must equal the
/// schema's exactly; anything else means encoder and schema drifted apart.
pub(crate) fn reorder_to_schema(
    working: Vec<(String, f64)>,
    schema: FeatureSchema,
) -> Result<Array1<f64>> {
    let mut out = Array1::zeros(schema.len());
    let mut seen = vec![false; schema.len()];
    let mut unexpected = Vec::new();

    for (name, value) in working {
        match schema.index_of(&name) {
            Some(i) if !seen[i] => {
                out[i] = value;
                seen[i] = true;
            }
            _ => unexpected.push(name),
        }
    }

    let missing: Vec<String> = schema
        .columns()
        .iter()
        .zip(&seen)
        .filter(|(_, seen)| !**seen)
        .map(|(c, _)| c.to_string())
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(SalaryError::SchemaMismatch {
            context: "encoder",
            missing,
            unexpected,
        });
    }
    Ok(out)
}
