use crate::cf::round_to;
use crate::data::KnowledgeBase;
use crate::engine::Diagnosis;
use crate::explanation::types::*;

/// Builds a [`DiagnosisReport`] from a diagnosis
pub struct ReportGenerator;

impl ReportGenerator {
    /// Generate the report
    ///
    /// Takes:
    /// - kb: knowledge base the diagnosis was computed against (names, solutions)
    /// - diagnosis: engine output
    pub fn generate(kb: &KnowledgeBase, diagnosis: &Diagnosis) -> DiagnosisReport {
        let symptoms_selected = Self::selected_symptoms(kb, diagnosis);

        let ranking: Vec<RankedNutrient> = diagnosis
            .ranked()
            .into_iter()
            .map(|(code, cf)| RankedNutrient {
                code: code.to_string(),
                name: kb
                    .nutrient(code)
                    .map(|n| n.name.clone())
                    .unwrap_or_else(|| code.to_string()),
                cf,
                cf_percentage: round_to(cf * 100.0, 2),
            })
            .collect();

        let top = diagnosis.top().and_then(|(code, cf)| match kb.nutrient(code) {
            Some(nutrient) => Some(TopDiagnosis {
                code: nutrient.code.clone(),
                name: nutrient.name.clone(),
                cf,
                cf_percentage: round_to(cf * 100.0, 2),
                level: CertaintyLevel::from_cf(cf),
                solution: nutrient.solution.clone(),
            }),
            None => {
                tracing::warn!("Nutrient details not found for {}", code);
                None
            }
        });

        let (outcome, message) = match &top {
            _ if diagnosis.observation.is_empty() => (
                Outcome::NoSymptoms,
                "Select at least one symptom to run a diagnosis.".to_string(),
            ),
            None => (
                Outcome::NoSignificantDiagnosis,
                "No significant diagnosis. The selected symptoms may not be specific enough."
                    .to_string(),
            ),
            Some(top) => (
                Outcome::Diagnosed,
                format!(
                    "Most likely: {} (CF {:.4}, {:.2}%)",
                    top.name, top.cf, top.cf_percentage
                ),
            ),
        };

        DiagnosisReport {
            outcome,
            message,
            top,
            ranking,
            symptoms_selected,
            anomalies: diagnosis.observation.anomalies().to_vec(),
            details: diagnosis.details.clone(),
        }
    }

    fn selected_symptoms(kb: &KnowledgeBase, diagnosis: &Diagnosis) -> Vec<SelectedSymptom> {
        diagnosis
            .observation
            .values()
            .iter()
            .map(|(code, &cf_user)| {
                let (name, category) = kb
                    .symptom(code)
                    .map(|s| (s.name.clone(), s.category.clone()))
                    .unwrap_or_else(|| (code.clone(), "Unknown".to_string()));
                SelectedSymptom {
                    code: code.clone(),
                    name,
                    category,
                    cf_user,
                }
            })
            .collect()
    }
}
