use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "BEGINNER",
            Self::Intermediate => "INTERMEDIATE",
            Self::Advanced => "ADVANCED",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "BEGINNER" => Self::Beginner,
            "ADVANCED" => Self::Advanced,
            _ => Self::Intermediate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub difficulty: u8,
    pub estimated_minutes: u32,
    #[serde(default)]
    pub next_topics: Vec<String>,
    #[serde(default)]
    pub concepts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopicMetadata {
    pub required_for: Vec<String>,
    pub building_blocks: Vec<String>,
    pub common_struggles: Vec<String>,
    pub remedial_content: Vec<String>,
    pub practice_exercises: Vec<String>,
}

/// Where the learner stands when a path is requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningContext {
    pub current_topic: String,
    #[serde(default)]
    pub completed_topics: BTreeSet<String>,
    #[serde(default)]
    pub struggled_topics: BTreeSet<String>,
}

impl LearningContext {
    pub fn at(topic: impl Into<String>) -> Self {
        Self {
            current_topic: topic.into(),
            ..Default::default()
        }
    }

    pub fn with_completed<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.completed_topics.extend(topics.into_iter().map(Into::into));
        self
    }

    pub fn with_struggled<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.struggled_topics.extend(topics.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub learner_id: String,
    pub sequence: Vec<String>,
    pub nodes: Vec<TopicNode>,
    pub completed_topics: BTreeSet<String>,
    pub struggled_topics: BTreeSet<String>,
    pub skill_level: SkillLevel,
    pub computed_at: i64,
}

/// Rolling score window and current difficulty for one topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPerformance {
    pub history: VecDeque<f64>,
    pub difficulty: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyAdjustment {
    pub topic_id: String,
    pub previous_difficulty: f64,
    pub new_difficulty: f64,
    pub reason: String,
    pub feedback: Vec<String>,
    pub recent_performance: f64,
    pub learning_rate: f64,
    pub consistency_score: f64,
    pub expected_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub learner_id: String,
    pub current_topic: Option<String>,
    pub completed_topics: BTreeSet<String>,
    pub struggled_topics: BTreeSet<String>,
    pub scores: BTreeMap<String, f64>,
    pub average_completion_minutes: f64,
    pub completion_samples: u32,
    pub last_activity: i64,
    pub skill_level: Option<SkillLevel>,
    pub recommended_path: Vec<String>,
    pub performance: BTreeMap<String, TopicPerformance>,
}

impl ProgressRecord {
    pub fn new(learner_id: &str) -> Self {
        Self {
            learner_id: learner_id.to_string(),
            current_topic: None,
            completed_topics: BTreeSet::new(),
            struggled_topics: BTreeSet::new(),
            scores: BTreeMap::new(),
            average_completion_minutes: 0.0,
            completion_samples: 0,
            last_activity: chrono::Utc::now().timestamp_millis(),
            skill_level: None,
            recommended_path: Vec::new(),
            performance: BTreeMap::new(),
        }
    }

    pub fn mark_completed(&mut self, topic_id: &str) {
        self.struggled_topics.remove(topic_id);
        self.completed_topics.insert(topic_id.to_string());
    }

    pub fn mark_struggled(&mut self, topic_id: &str) {
        self.completed_topics.remove(topic_id);
        self.struggled_topics.insert(topic_id.to_string());
    }

    pub fn record_completion_time(&mut self, minutes: f64) {
        let n = self.completion_samples as f64;
        self.average_completion_minutes = (self.average_completion_minutes * n + minutes) / (n + 1.0);
        self.completion_samples += 1;
    }

    pub fn touch(&mut self) {
        self.last_activity = chrono::Utc::now().timestamp_millis();
    }
}
