//! Diagnosis Engine - main coordinator for CF inference
//!
//! Normalizes the observation, evaluates every nutrient in catalog order and
//! packages scores plus calculation traces. Includes both sequential and
//! parallel (Rayon) evaluation; both produce identical results.
//!
//! The engine holds one immutable knowledge base snapshot. To pick up a
//! reloaded knowledge base, build a new engine from the store.

use crate::cf::{evaluate_nutrient, NutrientEvaluation};
use crate::data::KnowledgeBase;
use crate::error::{InferenceError, KnowledgeBaseError};
use crate::kb_cache::KnowledgeBaseStore;
use crate::ranker;
use crate::utils::normalization::{normalize_symptoms, NormalizedObservation, RawConfidence};
use rayon::prelude::*;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::sync::Arc;

/// Final CF per nutrient, in knowledge base catalog order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CfScores {
    entries: Vec<(String, f64)>,
}

impl CfScores {
    pub fn get(&self, code: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|&(_, cf)| cf)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(code, cf)| (code.as_str(), *cf))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when no nutrient received any evidence
    pub fn all_zero(&self) -> bool {
        self.entries.iter().all(|&(_, cf)| cf == 0.0)
    }
}

impl FromIterator<(String, f64)> for CfScores {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Serialized as a JSON object, keys in catalog order
impl Serialize for CfScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, cf) in &self.entries {
            map.serialize_entry(code, cf)?;
        }
        map.end()
    }
}

/// Outcome of one inference call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    /// Input after filtering and clamping, with the anomalies found
    pub observation: NormalizedObservation,
    pub scores: CfScores,
    /// One entry per nutrient, catalog order
    pub details: Vec<NutrientEvaluation>,
}

impl Diagnosis {
    pub fn detail(&self, nutrient_code: &str) -> Option<&NutrientEvaluation> {
        self.details.iter().find(|d| d.nutrient_code == nutrient_code)
    }

    pub fn top(&self) -> Option<(&str, f64)> {
        ranker::top(&self.scores)
    }

    pub fn ranked(&self) -> Vec<(&str, f64)> {
        ranker::ranked(&self.scores)
    }

    pub fn has_evidence(&self) -> bool {
        !self.scores.all_zero()
    }
}

/// CF inference over one knowledge base snapshot
#[derive(Debug, Clone)]
pub struct DiagnosisEngine {
    kb: Arc<KnowledgeBase>,
}

impl DiagnosisEngine {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    /// Engine over the store's current snapshot (loading it if needed)
    pub fn from_store(store: &KnowledgeBaseStore) -> Result<Self, KnowledgeBaseError> {
        Ok(Self::new(store.load()?))
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Normalize raw input and evaluate every nutrient
    pub fn calculate_cf_with_details<K, V>(
        &self,
        raw: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Diagnosis, InferenceError>
    where
        K: AsRef<str>,
        V: Into<RawConfidence>,
    {
        let observation = normalize_symptoms(&self.kb, raw);
        self.evaluate_observation(observation)
    }

    /// Scores only
    pub fn calculate_cf<K, V>(
        &self,
        raw: impl IntoIterator<Item = (K, V)>,
    ) -> Result<CfScores, InferenceError>
    where
        K: AsRef<str>,
        V: Into<RawConfidence>,
    {
        Ok(self.calculate_cf_with_details(raw)?.scores)
    }

    /// Evaluate an observation that has already been normalized
    pub fn evaluate_observation(
        &self,
        observation: NormalizedObservation,
    ) -> Result<Diagnosis, InferenceError> {
        let details = self
            .kb
            .nutrients()
            .iter()
            .map(|nutrient| evaluate_nutrient(&self.kb, nutrient, &observation))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::assemble(observation, details))
    }

    /// Same as [`calculate_cf_with_details`](Self::calculate_cf_with_details),
    /// evaluating nutrients on the Rayon thread pool
    pub fn calculate_cf_parallel<K, V>(
        &self,
        raw: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Diagnosis, InferenceError>
    where
        K: AsRef<str>,
        V: Into<RawConfidence>,
    {
        let observation = normalize_symptoms(&self.kb, raw);

        // Indexed parallel collect keeps catalog order
        let details = self
            .kb
            .nutrients()
            .par_iter()
            .map(|nutrient| evaluate_nutrient(&self.kb, nutrient, &observation))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::assemble(observation, details))
    }

    fn assemble(observation: NormalizedObservation, details: Vec<NutrientEvaluation>) -> Diagnosis {
        let scores: CfScores = details
            .iter()
            .map(|d| (d.nutrient_code.clone(), d.cf_final))
            .collect();

        let diagnosis = Diagnosis {
            observation,
            scores,
            details,
        };

        match diagnosis.top() {
            Some((code, cf)) => tracing::info!("Top diagnosis: {} (CF: {:.4})", code, cf),
            None => tracing::info!("No valid diagnosis found (all CF = 0)"),
        }

        diagnosis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::tomato_kb;
    use approx::assert_relative_eq;

    fn engine() -> DiagnosisEngine {
        DiagnosisEngine::new(Arc::new(tomato_kb()))
    }

    #[test]
    fn test_scores_cover_every_nutrient_in_catalog_order() {
        let engine = engine();
        let scores = engine.calculate_cf([("G19", 0.8)]).unwrap();

        let codes: Vec<&str> = scores.iter().map(|(c, _)| c).collect();
        let catalog: Vec<&str> = engine
            .knowledge_base()
            .nutrients()
            .iter()
            .map(|n| n.code.as_str())
            .collect();
        assert_eq!(codes, catalog);
    }

    #[test]
    fn test_calcium_scenario() {
        let diagnosis = engine()
            .calculate_cf_with_details([("G19", 0.8), ("G20", 1.0), ("G21", 0.6)])
            .unwrap();

        assert_eq!(diagnosis.scores.get("D04"), Some(0.987));
        assert_eq!(diagnosis.top(), Some(("D04", 0.987)));
        assert_relative_eq!(diagnosis.detail("D04").unwrap().cf_raw, 0.987008, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_observation_is_all_zero() {
        let diagnosis = engine()
            .calculate_cf_with_details(Vec::<(&str, f64)>::new())
            .unwrap();

        assert!(!diagnosis.has_evidence());
        assert!(diagnosis.scores.iter().all(|(_, cf)| cf == 0.0));
        assert!(diagnosis.details.iter().all(|d| d.rules_used.is_empty()));
        assert_eq!(diagnosis.top(), None);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let engine = engine();
        let input = [("G01", 0.8), ("G02", 0.6), ("G12", 1.0), ("G09", 0.4), ("G18", 0.7)];

        let sequential = engine.calculate_cf_with_details(input).unwrap();
        let parallel = engine.calculate_cf_parallel(input).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_scores_serialize_as_ordered_object() {
        let scores: CfScores = vec![("D02".to_string(), 0.5), ("D01".to_string(), 0.0)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&scores).unwrap();
        assert_eq!(json, r#"{"D02":0.5,"D01":0.0}"#);
    }
}
