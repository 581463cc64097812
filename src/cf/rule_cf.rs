//! Single-rule certainty factor
//!
//! CF(H, E) = CF_expert(H, E) × CF_user(E)

use crate::data::Symptom;
use serde::Serialize;

/// Contribution of one rule; both inputs are clamped into [0, 1] first
pub fn calculate_rule_cf(cf_pakar: f64, cf_user: f64) -> f64 {
    cf_pakar.clamp(0.0, 1.0) * cf_user.clamp(0.0, 1.0)
}

/// One fired rule in the calculation trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleContribution {
    pub symptom_code: String,
    pub symptom_name: String,
    pub symptom_category: String,
    /// Expert confidence from the rule
    pub cf_pakar: f64,
    /// User confidence after normalization
    pub cf_user: f64,
    pub cf_rule: f64,
    /// e.g. "0.8500 * 0.8000 = 0.6800"
    pub formula: String,
}

impl RuleContribution {
    pub fn new(symptom: &Symptom, cf_pakar: f64, cf_user: f64) -> Self {
        let cf_rule = calculate_rule_cf(cf_pakar, cf_user);
        Self {
            symptom_code: symptom.code.clone(),
            symptom_name: symptom.name.clone(),
            symptom_category: symptom.category.clone(),
            cf_pakar,
            cf_user,
            cf_rule,
            formula: format!("{:.4} * {:.4} = {:.4}", cf_pakar, cf_user, cf_rule),
        }
    }
}
