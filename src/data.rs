//! Knowledge Base Loading and Validation
//!
//! Parses the symptom / nutrient / rule catalog from its JSON document and
//! turns it into typed, immutable records. A [`KnowledgeBase`] can only be
//! built through validation, so everything downstream may assume:
//! - symptom codes and nutrient codes are unique
//! - every rule references an existing nutrient and symptom
//! - every rule cf lies in [0, 1]
//!
//! Document shape:
//! ```json
//! {
//!   "symptoms":  [{"code": "G19", "name": "...", "category": "Fruit"}],
//!   "nutrients": [{"code": "D04", "name": "...", "solusi": "..."}],
//!   "rules":     [{"nutrient": "D04", "symptom": "G19", "cf": 0.85}]
//! }
//! ```

use crate::error::{KnowledgeBaseError, ValidationError};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Observable symptom on the plant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
    pub code: String,
    pub name: String,
    pub category: String,
}

/// Nutrient deficiency hypothesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nutrient {
    pub code: String,
    pub name: String,
    /// Treatment advice shown with a positive diagnosis
    #[serde(rename = "solusi", alias = "solution")]
    pub solution: String,
}

/// Expert rule: observing `symptom` supports a deficiency of `nutrient` with
/// expert confidence `cf`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub nutrient: String,
    pub symptom: String,
    pub cf: f64,
}

/// Symptom/nutrient/rule counts (health checks and startup logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnowledgeBaseSummary {
    pub symptoms_count: usize,
    pub nutrients_count: usize,
    pub rules_count: usize,
}

/// Symptoms sharing a category, in catalog order
#[derive(Debug, Clone, Serialize)]
pub struct SymptomCategory<'a> {
    pub category: &'a str,
    pub symptoms: Vec<&'a Symptom>,
}

/// Validated, read-only knowledge base
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeBase {
    symptoms: Vec<Symptom>,
    nutrients: Vec<Nutrient>,
    rules: Vec<Rule>,

    #[serde(skip)]
    symptom_index: FxHashMap<String, usize>,
    #[serde(skip)]
    nutrient_index: FxHashMap<String, usize>,
    /// Nutrient code → rule indices in declared order
    #[serde(skip)]
    rules_by_nutrient: FxHashMap<String, Vec<usize>>,
}

const SYMPTOMS: &str = "symptoms";
const NUTRIENTS: &str = "nutrients";
const RULES: &str = "rules";

impl KnowledgeBase {
    /// Load and validate a knowledge base JSON file
    pub fn load(path: &Path) -> Result<Self, KnowledgeBaseError> {
        if !path.exists() {
            tracing::error!("Knowledge base file not found: {}", path.display());
            return Err(KnowledgeBaseError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Knowledge base loaded from {}", path.display());
        Self::from_json_str(&contents)
    }

    /// Parse and validate a knowledge base document held in memory
    pub fn from_json_str(json: &str) -> Result<Self, KnowledgeBaseError> {
        let document: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&document)?)
    }

    /// Validate an already-parsed document
    ///
    /// Checks run in a fixed order: collections, symptoms, nutrients, then
    /// rules (whose references resolve against the validated code sets).
    pub fn from_value(document: &Value) -> Result<Self, ValidationError> {
        let root = document.as_object().ok_or(ValidationError::NotAnObject {
            found: json_type(document),
        })?;

        let raw_symptoms = collection(root, SYMPTOMS)?;
        let raw_nutrients = collection(root, NUTRIENTS)?;
        let raw_rules = collection(root, RULES)?;

        let symptoms = validate_symptoms(raw_symptoms)?;
        let nutrients = validate_nutrients(raw_nutrients)?;

        let symptom_index = code_index(symptoms.iter().map(|s| &s.code));
        let nutrient_index = code_index(nutrients.iter().map(|n| &n.code));

        let rules = validate_rules(raw_rules, &symptom_index, &nutrient_index)?;
        let rules_by_nutrient = rule_index(&rules);

        tracing::info!("Knowledge base structure validation passed");

        Ok(Self {
            symptoms,
            nutrients,
            rules,
            symptom_index,
            nutrient_index,
            rules_by_nutrient,
        })
    }

    /// Assemble records without validation, for exercising inference faults
    #[cfg(test)]
    pub(crate) fn from_parts_unchecked(
        symptoms: Vec<Symptom>,
        nutrients: Vec<Nutrient>,
        rules: Vec<Rule>,
    ) -> Self {
        Self {
            symptom_index: code_index(symptoms.iter().map(|s| &s.code)),
            nutrient_index: code_index(nutrients.iter().map(|n| &n.code)),
            rules_by_nutrient: rule_index(&rules),
            symptoms,
            nutrients,
            rules,
        }
    }

    pub fn symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    pub fn nutrients(&self) -> &[Nutrient] {
        &self.nutrients
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Symptom details by code
    pub fn symptom(&self, code: &str) -> Option<&Symptom> {
        self.symptom_index.get(code).map(|&idx| &self.symptoms[idx])
    }

    /// Nutrient details by code
    pub fn nutrient(&self, code: &str) -> Option<&Nutrient> {
        self.nutrient_index.get(code).map(|&idx| &self.nutrients[idx])
    }

    pub fn contains_symptom(&self, code: &str) -> bool {
        self.symptom_index.contains_key(code)
    }

    /// Rules for one nutrient, in the order they were declared
    pub fn rules_for<'a>(&'a self, nutrient_code: &str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules_by_nutrient
            .get(nutrient_code)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.rules[idx])
    }

    /// Split symptom codes into (known, unknown), preserving input order
    pub fn partition_symptom_codes<'c, I>(&self, codes: I) -> (Vec<String>, Vec<String>)
    where
        I: IntoIterator<Item = &'c str>,
    {
        let (valid, invalid): (Vec<String>, Vec<String>) = codes
            .into_iter()
            .map(str::to_string)
            .partition(|code| self.contains_symptom(code));

        if !invalid.is_empty() {
            tracing::warn!("Invalid symptom codes found: {:?}", invalid);
        }

        (valid, invalid)
    }

    /// Symptoms grouped by category, categories in first-seen order
    pub fn symptoms_by_category(&self) -> Vec<SymptomCategory<'_>> {
        let mut groups: Vec<SymptomCategory<'_>> = Vec::new();
        let mut positions: FxHashMap<&str, usize> = FxHashMap::default();

        for symptom in &self.symptoms {
            let pos = *positions.entry(symptom.category.as_str()).or_insert_with(|| {
                groups.push(SymptomCategory {
                    category: symptom.category.as_str(),
                    symptoms: Vec::new(),
                });
                groups.len() - 1
            });
            groups[pos].symptoms.push(symptom);
        }

        groups
    }

    pub fn summary(&self) -> KnowledgeBaseSummary {
        KnowledgeBaseSummary {
            symptoms_count: self.symptoms.len(),
            nutrients_count: self.nutrients.len(),
            rules_count: self.rules.len(),
        }
    }
}

fn code_index<'a>(codes: impl Iterator<Item = &'a String>) -> FxHashMap<String, usize> {
    codes.enumerate().map(|(idx, code)| (code.clone(), idx)).collect()
}

/// Nutrient code → rule indices, declared order
fn rule_index(rules: &[Rule]) -> FxHashMap<String, Vec<usize>> {
    let mut index: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    for (idx, rule) in rules.iter().enumerate() {
        index.entry(rule.nutrient.clone()).or_default().push(idx);
    }
    index
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn collection<'a>(
    root: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a Vec<Value>, ValidationError> {
    let value = root
        .get(key)
        .ok_or(ValidationError::MissingCollection { key })?;
    value.as_array().ok_or(ValidationError::NotAList {
        key,
        found: json_type(value),
    })
}

fn record<'a>(
    value: &'a Value,
    collection: &'static str,
    index: usize,
) -> Result<&'a Map<String, Value>, ValidationError> {
    value
        .as_object()
        .ok_or(ValidationError::RecordNotObject { collection, index })
}

/// All `fields` must be present before any value is inspected
fn require_fields(
    rec: &Map<String, Value>,
    collection: &'static str,
    index: usize,
    fields: &[&'static str],
) -> Result<(), ValidationError> {
    for &field in fields {
        if !rec.contains_key(field) {
            return Err(ValidationError::MissingField {
                collection,
                index,
                field,
            });
        }
    }
    Ok(())
}

fn string_field(
    rec: &Map<String, Value>,
    collection: &'static str,
    index: usize,
    field: &'static str,
) -> Result<String, ValidationError> {
    match rec.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::InvalidField {
            collection,
            index,
            field,
        }),
        None => Err(ValidationError::MissingField {
            collection,
            index,
            field,
        }),
    }
}

fn validate_symptoms(raw: &[Value]) -> Result<Vec<Symptom>, ValidationError> {
    const COLLECTION: &str = "symptom";
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut symptoms = Vec::with_capacity(raw.len());

    for (idx, value) in raw.iter().enumerate() {
        let rec = record(value, COLLECTION, idx)?;
        require_fields(rec, COLLECTION, idx, &["code", "name", "category"])?;

        let symptom = Symptom {
            code: string_field(rec, COLLECTION, idx, "code")?,
            name: string_field(rec, COLLECTION, idx, "name")?,
            category: string_field(rec, COLLECTION, idx, "category")?,
        };

        if !seen.insert(symptom.code.clone()) {
            return Err(ValidationError::DuplicateCode {
                collection: COLLECTION,
                code: symptom.code,
            });
        }
        symptoms.push(symptom);
    }

    Ok(symptoms)
}

fn validate_nutrients(raw: &[Value]) -> Result<Vec<Nutrient>, ValidationError> {
    const COLLECTION: &str = "nutrient";
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut nutrients = Vec::with_capacity(raw.len());

    for (idx, value) in raw.iter().enumerate() {
        let rec = record(value, COLLECTION, idx)?;
        // Older documents spell the treatment key in English
        let solution_key = if rec.contains_key("solution") && !rec.contains_key("solusi") {
            "solution"
        } else {
            "solusi"
        };
        require_fields(rec, COLLECTION, idx, &["code", "name", solution_key])?;

        let nutrient = Nutrient {
            code: string_field(rec, COLLECTION, idx, "code")?,
            name: string_field(rec, COLLECTION, idx, "name")?,
            solution: string_field(rec, COLLECTION, idx, solution_key)?,
        };

        if !seen.insert(nutrient.code.clone()) {
            return Err(ValidationError::DuplicateCode {
                collection: COLLECTION,
                code: nutrient.code,
            });
        }
        nutrients.push(nutrient);
    }

    Ok(nutrients)
}

fn validate_rules(
    raw: &[Value],
    symptom_index: &FxHashMap<String, usize>,
    nutrient_index: &FxHashMap<String, usize>,
) -> Result<Vec<Rule>, ValidationError> {
    const COLLECTION: &str = "rule";
    let mut rules = Vec::with_capacity(raw.len());

    for (idx, value) in raw.iter().enumerate() {
        let rec = record(value, COLLECTION, idx)?;
        require_fields(rec, COLLECTION, idx, &["nutrient", "symptom", "cf"])?;

        let nutrient = string_field(rec, COLLECTION, idx, "nutrient")?;
        let symptom = string_field(rec, COLLECTION, idx, "symptom")?;

        if !nutrient_index.contains_key(&nutrient) {
            return Err(ValidationError::UnknownReference {
                index: idx,
                field: "nutrient",
                code: nutrient,
            });
        }
        if !symptom_index.contains_key(&symptom) {
            return Err(ValidationError::UnknownReference {
                index: idx,
                field: "symptom",
                code: symptom,
            });
        }

        let raw_cf = &rec["cf"];
        let cf = parse_confidence(raw_cf).ok_or_else(|| ValidationError::InvalidConfidence {
            index: idx,
            value: raw_cf.to_string(),
        })?;
        if !(0.0..=1.0).contains(&cf) {
            return Err(ValidationError::ConfidenceOutOfRange { index: idx, value: cf });
        }

        rules.push(Rule {
            nutrient,
            symptom,
            cf,
        });
    }

    Ok(rules)
}

/// JSON number or numeric string; non-finite values are rejected
fn parse_confidence(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_document() -> Value {
        json!({
            "symptoms": [
                {"code": "G19", "name": "Blossom end spot", "category": "Fruit"},
                {"code": "G20", "name": "Black leathery fruit end", "category": "Fruit"},
                {"code": "G21", "name": "Distorted young leaves", "category": "Leaf"}
            ],
            "nutrients": [
                {"code": "D04", "name": "Calcium deficiency", "solusi": "Apply calcium nitrate"}
            ],
            "rules": [
                {"nutrient": "D04", "symptom": "G19", "cf": 0.85},
                {"nutrient": "D04", "symptom": "G20", "cf": 0.93},
                {"nutrient": "D04", "symptom": "G21", "cf": 0.70}
            ]
        })
    }

    #[test]
    fn test_valid_document() {
        let kb = KnowledgeBase::from_value(&minimal_document()).unwrap();
        assert_eq!(kb.symptoms().len(), 3);
        assert_eq!(kb.nutrient("D04").unwrap().solution, "Apply calcium nitrate");

        let d04: Vec<&str> = kb.rules_for("D04").map(|r| r.symptom.as_str()).collect();
        assert_eq!(d04, vec!["G19", "G20", "G21"]);
        assert_eq!(kb.rules_for("D99").count(), 0);
    }

    #[test]
    fn test_root_must_be_object() {
        let err = KnowledgeBase::from_value(&json!([1, 2])).unwrap_err();
        assert_eq!(err, ValidationError::NotAnObject { found: "list" });
    }

    #[test]
    fn test_missing_collection() {
        let mut doc = minimal_document();
        doc.as_object_mut().unwrap().remove("rules");
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert_eq!(err, ValidationError::MissingCollection { key: "rules" });
    }

    #[test]
    fn test_collection_must_be_list() {
        let mut doc = minimal_document();
        doc["nutrients"] = json!({"code": "D04"});
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotAList {
                key: "nutrients",
                found: "object"
            }
        );
    }

    #[test]
    fn test_symptom_missing_field() {
        let mut doc = minimal_document();
        doc["symptoms"][1].as_object_mut().unwrap().remove("category");
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                collection: "symptom",
                index: 1,
                field: "category"
            }
        );
    }

    #[test]
    fn test_symptom_record_must_be_object() {
        let mut doc = minimal_document();
        doc["symptoms"][1] = json!("G20");
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RecordNotObject {
                collection: "symptom",
                index: 1
            }
        );
    }

    #[test]
    fn test_symptom_code_must_be_string() {
        let mut doc = minimal_document();
        doc["symptoms"][0]["code"] = json!(19);
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidField {
                collection: "symptom",
                index: 0,
                field: "code"
            }
        );
    }

    #[test]
    fn test_nutrient_missing_treatment() {
        let mut doc = minimal_document();
        doc["nutrients"][0] = json!({"code": "D04", "name": "Calcium"});
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                collection: "nutrient",
                index: 0,
                field: "solusi"
            }
        );
    }

    #[test]
    fn test_rule_missing_cf() {
        let mut doc = minimal_document();
        doc["rules"][2].as_object_mut().unwrap().remove("cf");
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                collection: "rule",
                index: 2,
                field: "cf"
            }
        );
    }

    #[test]
    fn test_duplicate_rules_are_kept() {
        let mut doc = minimal_document();
        doc["rules"]
            .as_array_mut()
            .unwrap()
            .push(json!({"nutrient": "D04", "symptom": "G19", "cf": 0.5}));
        let kb = KnowledgeBase::from_value(&doc).unwrap();
        let g19 = kb.rules_for("D04").filter(|r| r.symptom == "G19").count();
        assert_eq!(g19, 2);
    }

    #[test]
    fn test_duplicate_symptom_code() {
        let mut doc = minimal_document();
        doc["symptoms"][2]["code"] = json!("G19");
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateCode {
                collection: "symptom",
                code: "G19".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_nutrient_code() {
        let mut doc = minimal_document();
        doc["nutrients"]
            .as_array_mut()
            .unwrap()
            .push(json!({"code": "D04", "name": "Again", "solusi": "-"}));
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateCode { collection: "nutrient", .. }));
    }

    #[test]
    fn test_solution_alias_accepted() {
        let mut doc = minimal_document();
        doc["nutrients"][0] = json!({"code": "D04", "name": "Calcium", "solution": "Lime"});
        let kb = KnowledgeBase::from_value(&doc).unwrap();
        assert_eq!(kb.nutrient("D04").unwrap().solution, "Lime");
    }

    #[test]
    fn test_rule_unknown_symptom_reference() {
        let mut doc = minimal_document();
        doc["rules"][2]["symptom"] = json!("G99");
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownReference {
                index: 2,
                field: "symptom",
                code: "G99".to_string()
            }
        );
    }

    #[test]
    fn test_rule_unknown_nutrient_checked_first() {
        let mut doc = minimal_document();
        doc["rules"][0]["nutrient"] = json!("D99");
        doc["rules"][0]["symptom"] = json!("G99");
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnknownReference { index: 0, field: "nutrient", .. }
        ));
    }

    #[test]
    fn test_rule_cf_out_of_range() {
        let mut doc = minimal_document();
        doc["rules"][1]["cf"] = json!(1.2);
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert_eq!(err, ValidationError::ConfidenceOutOfRange { index: 1, value: 1.2 });
    }

    #[test]
    fn test_rule_cf_not_numeric() {
        let mut doc = minimal_document();
        doc["rules"][0]["cf"] = json!("high");
        let err = KnowledgeBase::from_value(&doc).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidConfidence {
                index: 0,
                value: "\"high\"".to_string()
            }
        );
    }

    #[test]
    fn test_rule_cf_numeric_string_accepted() {
        let mut doc = minimal_document();
        doc["rules"][0]["cf"] = json!(" 0.85 ");
        let kb = KnowledgeBase::from_value(&doc).unwrap();
        assert_eq!(kb.rules()[0].cf, 0.85);
    }

    #[test]
    fn test_partition_symptom_codes() {
        let kb = KnowledgeBase::from_value(&minimal_document()).unwrap();
        let (valid, invalid) = kb.partition_symptom_codes(["G20", "X1", "G19"]);
        assert_eq!(valid, vec!["G20", "G19"]);
        assert_eq!(invalid, vec!["X1"]);
    }

    #[test]
    fn test_symptoms_by_category_first_seen_order() {
        let kb = KnowledgeBase::from_value(&minimal_document()).unwrap();
        let groups = kb.symptoms_by_category();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Fruit");
        assert_eq!(groups[0].symptoms.len(), 2);
        assert_eq!(groups[1].category, "Leaf");
    }

    #[test]
    fn test_parse_error_is_not_validation() {
        let err = KnowledgeBase::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::Parse(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_missing_file() {
        let err = KnowledgeBase::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::NotFound { .. }));
    }
}
