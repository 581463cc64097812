//! Symptom Input Normalization
//!
//! Filters user-submitted symptom confidences against the knowledge base and
//! brings them into the CF range [0, 1].
//!
//! Per entry, in order:
//! 1. Unknown symptom code → dropped (not an error)
//! 2. Value not readable as a number → dropped
//! 3. Value outside [0, 1] → clamped
//!
//! Each of these is recorded as an [`InputAnomaly`] and logged at warn level,
//! so clamping never happens silently. A value of exactly 0 passes through.

use crate::data::KnowledgeBase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User confidence as submitted: a number, or text from a form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawConfidence {
    Number(f64),
    Text(String),
}

impl RawConfidence {
    /// Numeric value, if the input can be read as one (NaN cannot)
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            RawConfidence::Number(v) => Some(*v),
            RawConfidence::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| !v.is_nan())
    }
}

impl From<f64> for RawConfidence {
    fn from(value: f64) -> Self {
        RawConfidence::Number(value)
    }
}

impl From<&str> for RawConfidence {
    fn from(value: &str) -> Self {
        RawConfidence::Text(value.to_string())
    }
}

impl From<String> for RawConfidence {
    fn from(value: String) -> Self {
        RawConfidence::Text(value)
    }
}

impl std::fmt::Display for RawConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawConfidence::Number(v) => write!(f, "{}", v),
            RawConfidence::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Tolerated problem in user input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputAnomaly {
    /// Symptom code not in the knowledge base; entry dropped
    UnknownSymptom { code: String },
    /// Value could not be read as a number; entry dropped
    NonNumeric { code: String, value: String },
    /// Value outside [0, 1]; entry kept with the clamped value
    Clamped { code: String, original: f64, clamped: f64 },
}

impl InputAnomaly {
    pub fn code(&self) -> &str {
        match self {
            InputAnomaly::UnknownSymptom { code }
            | InputAnomaly::NonNumeric { code, .. }
            | InputAnomaly::Clamped { code, .. } => code.as_str(),
        }
    }
}

/// Usable symptom confidences (ordered by code) plus what was tolerated
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedObservation {
    values: BTreeMap<String, f64>,
    anomalies: Vec<InputAnomaly>,
}

impl NormalizedObservation {
    /// Take values as-is, without checking them against a knowledge base
    ///
    /// For callers that already normalized their input.
    pub fn from_values<K: Into<String>>(values: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            anomalies: Vec::new(),
        }
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.values.get(code).copied()
    }

    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    pub fn anomalies(&self) -> &[InputAnomaly] {
        &self.anomalies
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn was_clamped(&self, code: &str) -> bool {
        self.anomalies
            .iter()
            .any(|a| matches!(a, InputAnomaly::Clamped { code: c, .. } if c == code))
    }
}

/// Clamp a confidence into [0, 1]
pub fn clamp_confidence(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Normalize raw symptom confidences against the knowledge base
pub fn normalize_symptoms<K, V>(
    kb: &KnowledgeBase,
    raw: impl IntoIterator<Item = (K, V)>,
) -> NormalizedObservation
where
    K: AsRef<str>,
    V: Into<RawConfidence>,
{
    let mut observation = NormalizedObservation::default();
    let mut submitted = 0usize;

    for (code, value) in raw {
        submitted += 1;
        let code = code.as_ref();
        let value: RawConfidence = value.into();

        if !kb.contains_symptom(code) {
            tracing::warn!("Removing unknown symptom code: {}", code);
            observation.anomalies.push(InputAnomaly::UnknownSymptom {
                code: code.to_string(),
            });
            continue;
        }

        let Some(number) = value.as_number() else {
            tracing::warn!("Invalid CF value for {}: {}, skipping", code, value);
            observation.anomalies.push(InputAnomaly::NonNumeric {
                code: code.to_string(),
                value: value.to_string(),
            });
            continue;
        };

        let clamped = clamp_confidence(number);
        if clamped != number {
            tracing::warn!(
                "CF value for {} ({}) out of range [0.0, 1.0], clamping to {}",
                code,
                number,
                clamped
            );
            observation.anomalies.push(InputAnomaly::Clamped {
                code: code.to_string(),
                original: number,
                clamped,
            });
        }

        observation.values.insert(code.to_string(), clamped);
    }

    if submitted == 0 {
        tracing::warn!("No symptoms selected");
    } else if observation.is_empty() {
        tracing::warn!("No valid symptoms after validation");
    }
    tracing::info!(
        "Validated {} symptoms out of {}",
        observation.len(),
        submitted
    );

    observation
}
