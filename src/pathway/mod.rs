pub mod catalog;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod graph;
pub mod optimizer;
pub mod projection;
pub mod store;
pub mod types;

pub use catalog::{Catalog, TopicEntry};
pub use config::EngineConfig;
pub use engine::LearningPathEngine;
pub use error::{CatalogError, PathError, PathResult};
pub use graph::KnowledgeGraph;
pub use types::*;
