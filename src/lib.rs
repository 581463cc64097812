//! Tomato Nutrient Deficiency CF Engine
//!
//! Certainty-factor inference over an expert rule base: symptoms observed on
//! a tomato plant are weighed against expert rules to rank probable nutrient
//! deficiencies, with a step-by-step calculation trail for every result.
//!
//! Module layout:
//! - `data`: typed knowledge base records and load-time validation
//! - `kb_cache`: snapshot cache with explicit reload
//! - `utils/`: symptom input normalization
//! - `cf/`: rule CF, evidence combination, per-nutrient evaluation
//! - `engine`: inference coordinator (sequential and Rayon)
//! - `ranker`: top diagnosis and ranking
//! - `explanation/`: reports and Markdown/JSON formatters
//!
//! ```no_run
//! use nutrient_cf_rust::{DiagnosisEngine, KnowledgeBaseStore};
//!
//! let store = KnowledgeBaseStore::from_path("data/knowledge_base.json");
//! let engine = DiagnosisEngine::from_store(&store)?;
//! let diagnosis = engine.calculate_cf_with_details([("G19", 0.8), ("G20", 1.0)])?;
//! println!("{:?}", diagnosis.top());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod data;
pub mod kb_cache;
pub mod utils;
pub mod cf;
pub mod engine;
pub mod ranker;
pub mod explanation;
pub mod config;

#[cfg(test)]
mod test_fixtures;

// Re-export commonly used types
pub use error::{InferenceError, KnowledgeBaseError, ValidationError};
pub use data::{KnowledgeBase, KnowledgeBaseSummary, Nutrient, Rule, Symptom};
pub use kb_cache::{KnowledgeBaseSource, KnowledgeBaseStore};
pub use utils::{normalize_symptoms, InputAnomaly, NormalizedObservation, RawConfidence};
pub use cf::{CombinationStep, NutrientEvaluation, RuleContribution};
pub use engine::{CfScores, Diagnosis, DiagnosisEngine};
pub use explanation::{DiagnosisReport, JsonFormatter, MarkdownFormatter, ReportGenerator};
pub use config::{EngineConfig, OutputFormat};
