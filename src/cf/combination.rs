//! Evidence combination for one hypothesis
//!
//! CF_combined = CF_old + CF_new × (1 − CF_old), folded left to right.
//!
//! For non-negative inputs the result is order-independent in exact
//! arithmetic, but the step trace follows the order the rules were declared
//! in so the explanation matches the knowledge base.

use serde::Serialize;

/// One fold of the combination recurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationStep {
    /// 1-based; step 1 folds the second contribution into the first
    pub step: usize,
    pub cf_old: f64,
    pub cf_new: f64,
    pub result: f64,
    /// e.g. "0.6800 + 0.9300 * (1 - 0.6800)"
    pub calculation: String,
}

pub fn combine_cf(cf_old: f64, cf_new: f64) -> f64 {
    cf_old + cf_new * (1.0 - cf_old)
}

/// Combine contributions in order, returning the final CF and the steps
///
/// No contributions → 0.0; one contribution → itself with no steps.
pub fn combine_multiple_cf(cf_list: &[f64]) -> (f64, Vec<CombinationStep>) {
    let Some((&first, rest)) = cf_list.split_first() else {
        return (0.0, Vec::new());
    };

    let mut combined = first;
    let mut steps = Vec::with_capacity(rest.len());

    for (idx, &cf_new) in rest.iter().enumerate() {
        let cf_old = combined;
        combined = combine_cf(cf_old, cf_new);

        steps.push(CombinationStep {
            step: idx + 1,
            cf_old,
            cf_new,
            result: combined,
            calculation: format!("{:.4} + {:.4} * (1 - {:.4})", cf_old, cf_new, cf_old),
        });
    }

    (combined, steps)
}
