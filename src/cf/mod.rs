//! Certainty-factor calculation
//!
//! - `rule_cf`: contribution of a single rule (expert cf × user cf)
//! - `combination`: sequential evidence combination with a step trace
//! - `evaluator`: all rules for one nutrient against an observation

pub mod rule_cf;
pub mod combination;
pub mod evaluator;

pub use rule_cf::{calculate_rule_cf, RuleContribution};
pub use combination::{combine_cf, combine_multiple_cf, CombinationStep};
pub use evaluator::{evaluate_nutrient, NutrientEvaluation};

/// Decimal places used when presenting CF values
pub const CF_DECIMALS: i32 = 4;

/// Round to `decimals` places (half away from zero)
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round a CF for presentation
pub fn round_cf(value: f64) -> f64 {
    round_to(value, CF_DECIMALS)
}
