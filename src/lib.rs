pub mod config;
pub mod logging;
pub mod pathway;

pub use pathway::{
    Catalog, CatalogError, EngineConfig, KnowledgeGraph, LearningPathEngine, PathError,
};
