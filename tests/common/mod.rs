#![allow(dead_code)]

use std::sync::Arc;

use danci_learning_path::pathway::types::TopicMetadata;
use danci_learning_path::pathway::{
    Catalog, EngineConfig, KnowledgeGraph, LearningPathEngine, TopicEntry,
};

/// variables -> functions -> objects, with `scope` offered next to `objects`
/// and marked as required for `functions`.
pub fn intro_catalog() -> Catalog {
    Catalog::new(vec![
        TopicEntry::new("variables", 1, 15).leads_to(&["functions"]),
        TopicEntry::new("functions", 3, 30)
            .requires(&["variables"])
            .leads_to(&["objects", "scope"]),
        TopicEntry::new("objects", 4, 45).requires(&["functions"]),
        TopicEntry::new("scope", 3, 20)
            .requires(&["functions"])
            .with_metadata(TopicMetadata {
                required_for: vec!["functions".to_string()],
                remedial_content: vec!["Scope boxes diagram".to_string()],
                practice_exercises: vec!["Predict nested scope output".to_string()],
                ..Default::default()
            }),
    ])
}

pub fn intro_graph() -> Arc<KnowledgeGraph> {
    Arc::new(KnowledgeGraph::from_catalog(intro_catalog()).expect("intro catalog is valid"))
}

pub fn intro_engine() -> LearningPathEngine {
    LearningPathEngine::new(intro_graph(), EngineConfig::default())
}

pub fn builtin_engine() -> LearningPathEngine {
    let catalog = Catalog::builtin().expect("builtin catalog parses");
    let graph = KnowledgeGraph::from_catalog(catalog).expect("builtin catalog is valid");
    LearningPathEngine::new(Arc::new(graph), EngineConfig::default())
}

pub fn position(path: &[String], id: &str) -> usize {
    path.iter()
        .position(|topic| topic == id)
        .unwrap_or_else(|| panic!("{id} missing from path {path:?}"))
}
