//! Utility modules for CF inference
//!
//! - Normalization: symptom input filtering and clamping

pub mod normalization;

// Re-export commonly used types
pub use normalization::{
    clamp_confidence, normalize_symptoms, InputAnomaly, NormalizedObservation, RawConfidence,
};
