use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog contains no topics")]
    Empty,
    #[error("duplicate topic id: {0}")]
    DuplicateTopic(String),
    #[error("topic {topic} references unknown {relation} {target}")]
    DanglingReference {
        topic: String,
        relation: &'static str,
        target: String,
    },
    #[error("topic {topic} has difficulty {difficulty}, expected 1..=10")]
    DifficultyOutOfRange { topic: String, difficulty: u8 },
    #[error("prerequisite cycle detected at topic {0}")]
    Cycle(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("validation error: performance score {0} outside [0, 1]")]
    InvalidScore(f64),
    #[error("validation error: time spent {0} must be a non-negative number of minutes")]
    InvalidTimeSpent(f64),
    #[error("validation error: {0} must not be empty")]
    EmptyId(&'static str),
}

pub type PathResult<T> = Result<T, PathError>;

pub(crate) fn validate_score(score: f64) -> PathResult<f64> {
    if score.is_finite() && (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(PathError::InvalidScore(score))
    }
}

pub(crate) fn validate_time_spent(minutes: f64) -> PathResult<f64> {
    if minutes.is_finite() && minutes >= 0.0 {
        Ok(minutes)
    } else {
        Err(PathError::InvalidTimeSpent(minutes))
    }
}

pub(crate) fn validate_id<'a>(value: &'a str, field: &'static str) -> PathResult<&'a str> {
    if value.trim().is_empty() {
        Err(PathError::EmptyId(field))
    } else {
        Ok(value)
    }
}
