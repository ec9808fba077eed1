use serde::{Deserialize, Serialize};

use crate::pathway::types::SkillLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub beginner_max_difficulty: u8,
    pub intermediate_max_difficulty: u8,
    pub alternative_paths: usize,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            beginner_max_difficulty: 2,
            intermediate_max_difficulty: 4,
            alternative_paths: 2,
        }
    }
}

impl PathConfig {
    pub fn max_difficulty(&self, skill: SkillLevel) -> Option<u8> {
        match skill {
            SkillLevel::Beginner => Some(self.beginner_max_difficulty),
            SkillLevel::Intermediate => Some(self.intermediate_max_difficulty),
            SkillLevel::Advanced => None,
        }
    }

    pub fn allows(&self, skill: SkillLevel, difficulty: u8) -> bool {
        self.max_difficulty(skill)
            .map_or(true, |max| difficulty <= max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyParams {
    pub default_difficulty: f64,
    pub min_difficulty: f64,
    pub max_difficulty: f64,
    pub window_size: usize,
    pub base_minutes: f64,
    pub growth_factor: f64,
    pub high_performance: f64,
    pub low_performance: f64,
    pub fast_ratio: f64,
    pub slow_ratio: f64,
    pub max_attempts: u32,
    pub rapid_learning_rate: f64,
    pub consistency_threshold: f64,
    pub performance_step: f64,
    pub time_step: f64,
    pub attempts_step: f64,
    pub learning_rate_step: f64,
    pub consistency_step: f64,
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self {
            default_difficulty: 5.0,
            min_difficulty: 1.0,
            max_difficulty: 10.0,
            window_size: 5,
            base_minutes: 5.0,
            growth_factor: 1.5,
            high_performance: 0.7,
            low_performance: 0.3,
            fast_ratio: 0.7,
            slow_ratio: 1.5,
            max_attempts: 3,
            rapid_learning_rate: 0.1,
            consistency_threshold: 0.8,
            performance_step: 0.5,
            time_step: 0.3,
            attempts_step: 0.2,
            learning_rate_step: 0.2,
            consistency_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressThresholds {
    pub completed: f64,
    pub struggled: f64,
}

impl Default for ProgressThresholds {
    fn default() -> Self {
        Self {
            completed: 0.8,
            struggled: 0.6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub path: PathConfig,
    pub difficulty: DifficultyParams,
    pub thresholds: ProgressThresholds,
    pub history_cap: usize,
    pub fallback_skill_level: SkillLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathConfig::default(),
            difficulty: DifficultyParams::default(),
            thresholds: ProgressThresholds::default(),
            history_cap: 20,
            fallback_skill_level: SkillLevel::Intermediate,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LEARNING_PATH_HISTORY_CAP") {
            config.history_cap = val.parse().unwrap_or(config.history_cap);
        }
        if let Ok(val) = std::env::var("LEARNING_PATH_ALTERNATIVES") {
            config.path.alternative_paths = val.parse().unwrap_or(config.path.alternative_paths);
        }
        if let Ok(val) = std::env::var("LEARNING_PATH_BEGINNER_MAX") {
            config.path.beginner_max_difficulty =
                val.parse().unwrap_or(config.path.beginner_max_difficulty);
        }
        if let Ok(val) = std::env::var("LEARNING_PATH_INTERMEDIATE_MAX") {
            config.path.intermediate_max_difficulty =
                val.parse().unwrap_or(config.path.intermediate_max_difficulty);
        }
        if let Ok(val) = std::env::var("LEARNING_PATH_DEFAULT_DIFFICULTY") {
            config.difficulty.default_difficulty =
                val.parse().unwrap_or(config.difficulty.default_difficulty);
        }
        if let Ok(val) = std::env::var("LEARNING_PATH_FALLBACK_SKILL") {
            config.fallback_skill_level = SkillLevel::parse(&val);
        }

        // only the tail of the history is ever read
        config.history_cap = config.history_cap.max(config.difficulty.window_size);
        config
    }
}
