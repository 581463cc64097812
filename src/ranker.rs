//! Diagnosis ranking
//!
//! Ties are broken by catalog order (the order of [`CfScores`]), never by
//! hash iteration order, so the same input always ranks the same way.

use crate::engine::CfScores;

/// Nutrient with the greatest CF, or `None` when nothing scored above 0
pub fn top(scores: &CfScores) -> Option<(&str, f64)> {
    let mut best: Option<(&str, f64)> = None;

    for (code, cf) in scores.iter() {
        if cf <= 0.0 {
            continue;
        }
        match best {
            Some((_, best_cf)) if cf <= best_cf => {}
            _ => best = Some((code, cf)),
        }
    }

    best
}

/// Nutrients with CF > 0, highest first; equal CFs keep catalog order
pub fn ranked(scores: &CfScores) -> Vec<(&str, f64)> {
    let mut positive: Vec<(&str, f64)> = scores.iter().filter(|&(_, cf)| cf > 0.0).collect();
    positive.sort_by(|a, b| b.1.total_cmp(&a.1));
    positive
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(entries: &[(&str, f64)]) -> CfScores {
        entries.iter().map(|&(c, v)| (c.to_string(), v)).collect()
    }

    #[test]
    fn test_top_empty() {
        assert_eq!(top(&CfScores::default()), None);
    }

    #[test]
    fn test_top_all_zero() {
        assert_eq!(top(&scores(&[("D01", 0.0), ("D02", 0.0)])), None);
    }

    #[test]
    fn test_top_picks_greatest() {
        let s = scores(&[("D01", 0.42), ("D02", 0.9), ("D03", 0.5)]);
        assert_eq!(top(&s), Some(("D02", 0.9)));
    }

    #[test]
    fn test_top_tie_goes_to_catalog_order() {
        let s = scores(&[("D03", 0.0), ("D07", 0.8), ("D02", 0.8)]);
        assert_eq!(top(&s), Some(("D07", 0.8)));
    }

    #[test]
    fn test_ranked_descending_and_stable() {
        let s = scores(&[("D01", 0.5), ("D02", 0.0), ("D03", 0.9), ("D04", 0.5)]);
        assert_eq!(ranked(&s), vec![("D03", 0.9), ("D01", 0.5), ("D04", 0.5)]);
    }
}
