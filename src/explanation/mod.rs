pub mod types;
pub mod generator;
pub mod formatters;

pub use types::{
    CertaintyLevel, DiagnosisReport, Outcome, RankedNutrient, SelectedSymptom, TopDiagnosis,
};

pub use generator::ReportGenerator;
pub use formatters::{JsonFormatter, MarkdownFormatter};
