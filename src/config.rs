use std::path::PathBuf;

use crate::pathway::types::SkillLevel;

/// Process-level settings for the `danci-learning-path` binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Daily-rolling log files are written here when set.
    pub log_dir: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub sample_learner: String,
    pub sample_topic: Option<String>,
    pub sample_skill: SkillLevel,
}

impl Config {
    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let file_logs = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let log_dir = file_logs.then(|| {
            std::env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./logs"))
        });

        let catalog_path = non_empty_var("TOPIC_CATALOG_PATH").map(PathBuf::from);

        let sample_learner =
            std::env::var("LEARNING_PATH_LEARNER").unwrap_or_else(|_| "local_user".to_string());

        let sample_topic = non_empty_var("LEARNING_PATH_TOPIC");

        let sample_skill = std::env::var("LEARNING_PATH_SKILL")
            .map(|value| SkillLevel::parse(&value))
            .unwrap_or_default();

        Self {
            log_level,
            log_dir,
            catalog_path,
            sample_learner,
            sample_topic,
            sample_skill,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
