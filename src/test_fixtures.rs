//! Shared fixtures for unit tests

use crate::data::KnowledgeBase;

pub const TOMATO_KB_JSON: &str = include_str!("../data/knowledge_base.json");

pub fn tomato_kb() -> KnowledgeBase {
    KnowledgeBase::from_json_str(TOMATO_KB_JSON).expect("bundled knowledge base is valid")
}
