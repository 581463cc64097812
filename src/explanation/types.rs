use serde::Serialize;
use crate::cf::NutrientEvaluation;
use crate::utils::normalization::InputAnomaly;

/// Complete, presentation-ready report for one consultation
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisReport {
    pub outcome: Outcome,
    pub message: String,
    pub top: Option<TopDiagnosis>,
    /// Nutrients with CF > 0, highest first
    pub ranking: Vec<RankedNutrient>,
    pub symptoms_selected: Vec<SelectedSymptom>,
    pub anomalies: Vec<InputAnomaly>,
    /// Calculation trace for every nutrient, catalog order
    pub details: Vec<NutrientEvaluation>,
}

impl DiagnosisReport {
    /// Details for nutrients that received evidence
    pub fn details_with_evidence(&self) -> impl Iterator<Item = &NutrientEvaluation> {
        self.details.iter().filter(|d| d.has_evidence())
    }
}

/// How the consultation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing usable was left after input normalization
    NoSymptoms,
    /// Symptoms were usable but no rule fired
    NoSignificantDiagnosis,
    Diagnosed,
}

/// Best-supported deficiency with its treatment
#[derive(Debug, Clone, Serialize)]
pub struct TopDiagnosis {
    pub code: String,
    pub name: String,
    pub cf: f64,
    pub cf_percentage: f64,
    pub level: CertaintyLevel,
    pub solution: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedNutrient {
    pub code: String,
    pub name: String,
    pub cf: f64,
    pub cf_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectedSymptom {
    pub code: String,
    pub name: String,
    pub category: String,
    pub cf_user: f64,
}

/// Verbal reading of a combined CF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CertaintyLevel {
    AlmostCertain,
    Probable,
    Possible,
    Weak,
    Unknown,
}

impl CertaintyLevel {
    pub fn from_cf(cf: f64) -> Self {
        match cf {
            c if c >= 0.8 => CertaintyLevel::AlmostCertain,
            c if c >= 0.6 => CertaintyLevel::Probable,
            c if c >= 0.4 => CertaintyLevel::Possible,
            c if c > 0.0 => CertaintyLevel::Weak,
            _ => CertaintyLevel::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CertaintyLevel::AlmostCertain => "Almost certain",
            CertaintyLevel::Probable => "Probable",
            CertaintyLevel::Possible => "Possible",
            CertaintyLevel::Weak => "Weak evidence",
            CertaintyLevel::Unknown => "Unknown",
        }
    }
}
