//! Topic catalog: the static topic/metadata dataset the knowledge graph is built from.
//!
//! The on-disk format is JSON with camelCase keys:
//!
//! ```json
//! { "topics": [ { "id": "loops", "name": "Loops", "prerequisites": ["conditionals"],
//!                 "difficulty": 2, "estimatedMinutes": 30, "nextTopics": ["functions"],
//!                 "concepts": ["iteration"], "metadata": { "requiredFor": ["functions"] } } ] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pathway::error::CatalogError;
use crate::pathway::types::{TopicMetadata, TopicNode};

const BUILTIN_CATALOG: &str = include_str!("../../data/default_topics.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicEntry {
    #[serde(flatten)]
    pub node: TopicNode,
    #[serde(default)]
    pub metadata: TopicMetadata,
}

impl TopicEntry {
    pub fn new(id: &str, difficulty: u8, estimated_minutes: u32) -> Self {
        Self {
            node: TopicNode {
                id: id.to_string(),
                name: id.replace('_', " "),
                prerequisites: Vec::new(),
                difficulty,
                estimated_minutes,
                next_topics: Vec::new(),
                concepts: Vec::new(),
            },
            metadata: TopicMetadata::default(),
        }
    }

    pub fn requires(mut self, prerequisites: &[&str]) -> Self {
        self.node.prerequisites = prerequisites.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn leads_to(mut self, next_topics: &[&str]) -> Self {
        self.node.next_topics = next_topics.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_metadata(mut self, metadata: TopicMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub topics: Vec<TopicEntry>,
}

impl Catalog {
    pub fn new(topics: Vec<TopicEntry>) -> Self {
        Self { topics }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), topics = catalog.topics.len(), "topic catalog loaded");
        Ok(catalog)
    }

    /// Introductory programming curriculum shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.len() > 10);
        let scope = catalog
            .topics
            .iter()
            .find(|t| t.node.id == "scope")
            .unwrap();
        assert!(scope.metadata.required_for.contains(&"functions".to_string()));
    }

    #[test]
    fn test_optional_fields_default() {
        let catalog = Catalog::from_json_str(
            r#"{"topics":[{"id":"a","name":"A","difficulty":1,"estimatedMinutes":5}]}"#,
        )
        .unwrap();
        let entry = &catalog.topics[0];
        assert!(entry.node.prerequisites.is_empty());
        assert!(entry.node.next_topics.is_empty());
        assert_eq!(entry.metadata, TopicMetadata::default());
    }

    #[test]
    fn test_malformed_json_is_error() {
        let err = Catalog::from_json_str("{\"topics\": [").unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Catalog::from_path("/nonexistent/topics.json").unwrap_err();
        match err {
            CatalogError::Io { path, .. } => assert!(path.contains("topics.json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
