//! Rule evaluation for a single nutrient hypothesis

use crate::cf::{combine_multiple_cf, round_cf, round_to, CombinationStep, RuleContribution};
use crate::data::{KnowledgeBase, Nutrient};
use crate::error::InferenceError;
use crate::utils::normalization::NormalizedObservation;
use serde::Serialize;

/// Result and calculation trace for one nutrient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientEvaluation {
    pub nutrient_code: String,
    pub nutrient_name: String,
    /// Fired rules in declared order
    pub rules_used: Vec<RuleContribution>,
    /// `cf_rule` of each fired rule, same order
    pub cf_list: Vec<f64>,
    pub combination_steps: Vec<CombinationStep>,
    /// Unrounded combined CF
    pub cf_raw: f64,
    /// Combined CF rounded to 4 decimals
    pub cf_final: f64,
    pub cf_percentage: f64,
}

impl NutrientEvaluation {
    pub fn has_evidence(&self) -> bool {
        !self.rules_used.is_empty()
    }
}

/// Evaluate every rule of `nutrient` against the observation
///
/// A rule fires when its symptom was observed with confidence > 0. Rules
/// that do not fire leave no trace.
pub fn evaluate_nutrient(
    kb: &KnowledgeBase,
    nutrient: &Nutrient,
    observation: &NormalizedObservation,
) -> Result<NutrientEvaluation, InferenceError> {
    let mut rules_used = Vec::new();

    for rule in kb.rules_for(&nutrient.code) {
        let symptom = kb
            .symptom(&rule.symptom)
            .ok_or_else(|| InferenceError::DanglingRule {
                nutrient: nutrient.code.clone(),
                symptom: rule.symptom.clone(),
            })?;

        match observation.get(&rule.symptom) {
            Some(cf_user) if cf_user > 0.0 => {
                rules_used.push(RuleContribution::new(symptom, rule.cf, cf_user));
            }
            _ => {}
        }
    }

    let cf_list: Vec<f64> = rules_used.iter().map(|r| r.cf_rule).collect();
    let (cf_raw, combination_steps) = combine_multiple_cf(&cf_list);
    let cf_final = round_cf(cf_raw);

    if !cf_list.is_empty() {
        tracing::debug!(
            "{}: {} rules fired, CF = {:.4}",
            nutrient.code,
            cf_list.len(),
            cf_final
        );
    }

    Ok(NutrientEvaluation {
        nutrient_code: nutrient.code.clone(),
        nutrient_name: nutrient.name.clone(),
        rules_used,
        cf_list,
        combination_steps,
        cf_raw,
        cf_final,
        cf_percentage: round_to(cf_final * 100.0, 2),
    })
}
