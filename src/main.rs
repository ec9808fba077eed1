use std::sync::Arc;

use serde::Serialize;

use danci_learning_path::config::Config;
use danci_learning_path::logging::init_tracing;
use danci_learning_path::pathway::projection::PathProjection;
use danci_learning_path::pathway::{
    Catalog, EngineConfig, KnowledgeGraph, LearningContext, LearningPathEngine,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    curriculum: Vec<String>,
    projection: Option<PathProjection>,
}

fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config);

    if let Err(err) = run(&config) {
        tracing::error!(error = %err, "learning path engine failed to start");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)?,
        None => {
            tracing::info!("TOPIC_CATALOG_PATH not set, using builtin curriculum");
            Catalog::builtin()?
        }
    };

    let graph = Arc::new(KnowledgeGraph::from_catalog(catalog)?);
    let engine = LearningPathEngine::new(Arc::clone(&graph), EngineConfig::from_env());

    let start = config
        .sample_topic
        .clone()
        .or_else(|| graph.topological_order().first().cloned())
        .unwrap_or_default();

    engine.generate_learning_path(
        &config.sample_learner,
        &LearningContext::at(start),
        config.sample_skill,
    )?;

    let report = Report {
        curriculum: graph.topological_order().to_vec(),
        projection: engine.project_path(&config.sample_learner),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
