use std::sync::Arc;

use crate::pathway::config::EngineConfig;
use crate::pathway::difficulty::DifficultyAdjuster;
use crate::pathway::error::{validate_id, validate_score, validate_time_spent, PathError, PathResult};
use crate::pathway::graph::KnowledgeGraph;
use crate::pathway::optimizer::PathOptimizer;
use crate::pathway::projection::{PathProjection, PathProjector};
use crate::pathway::store::{apply_score, InMemoryProgressStore, ProgressRepository};
use crate::pathway::types::{
    DifficultyAdjustment, LearningContext, LearningPath, ProgressRecord, SkillLevel,
};

pub struct LearningPathEngine<S = InMemoryProgressStore> {
    config: EngineConfig,
    graph: Arc<KnowledgeGraph>,
    optimizer: PathOptimizer,
    adjuster: DifficultyAdjuster,
    projector: PathProjector,
    store: S,
}

impl LearningPathEngine<InMemoryProgressStore> {
    pub fn new(graph: Arc<KnowledgeGraph>, config: EngineConfig) -> Self {
        Self::with_store(graph, config, InMemoryProgressStore::new())
    }
}

impl<S: ProgressRepository> LearningPathEngine<S> {
    pub fn with_store(graph: Arc<KnowledgeGraph>, config: EngineConfig, store: S) -> Self {
        let optimizer = PathOptimizer::new(Arc::clone(&graph), config.path.clone());
        let adjuster = DifficultyAdjuster::new(config.difficulty.clone(), config.history_cap);
        let projector = PathProjector::new(Arc::clone(&graph), config.path.alternative_paths);
        Self {
            config,
            graph,
            optimizer,
            adjuster,
            projector,
            store,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &Arc<KnowledgeGraph> {
        &self.graph
    }

    pub fn optimizer(&self) -> &PathOptimizer {
        &self.optimizer
    }

    /// Computes a path from `context` merged over the learner's stored progress and
    /// caches it on the learner record.
    ///
    /// Topics named in the context win over stored state: a topic listed as struggled in
    /// the context is dropped from the stored completed set and vice versa. An empty
    /// `current_topic` falls back to the stored current topic; with neither, the call fails
    /// without creating a record.
    pub fn generate_learning_path(
        &self,
        learner_id: &str,
        context: &LearningContext,
        skill: SkillLevel,
    ) -> PathResult<LearningPath> {
        validate_id(learner_id, "learner_id")?;

        let current = if context.current_topic.trim().is_empty() {
            self.store
                .snapshot(learner_id)
                .and_then(|record| record.current_topic)
                .ok_or(PathError::EmptyId("current_topic"))?
        } else {
            context.current_topic.clone()
        };

        let path = self.store.update(learner_id, |record| {
            for topic in &context.completed_topics {
                record.mark_completed(topic);
            }
            for topic in &context.struggled_topics {
                record.mark_struggled(topic);
            }
            record.current_topic = Some(current.clone());
            record.skill_level = Some(skill);
            record.touch();

            let sequence = self.optimizer.compute_path(
                &current,
                &record.completed_topics,
                &record.struggled_topics,
                skill,
            );
            record.recommended_path = sequence.clone();

            tracing::info!(
                learner_id,
                current_topic = %current,
                skill = skill.as_str(),
                length = sequence.len(),
                "learning path generated"
            );

            LearningPath {
                learner_id: learner_id.to_string(),
                nodes: sequence
                    .iter()
                    .filter_map(|id| self.graph.get_node(id).cloned())
                    .collect(),
                sequence,
                completed_topics: record.completed_topics.clone(),
                struggled_topics: record.struggled_topics.clone(),
                skill_level: skill,
                computed_at: record.last_activity,
            }
        });
        Ok(path)
    }

    pub fn update_progress(&self, learner_id: &str, topic_id: &str, score: f64) -> PathResult<()> {
        self.record_progress(learner_id, topic_id, score, None)
    }

    /// Same as [`update_progress`](Self::update_progress) and also folds `minutes` into the
    /// learner's average completion time.
    pub fn update_progress_with_time(
        &self,
        learner_id: &str,
        topic_id: &str,
        score: f64,
        minutes: f64,
    ) -> PathResult<()> {
        self.record_progress(learner_id, topic_id, score, Some(minutes))
    }

    fn record_progress(
        &self,
        learner_id: &str,
        topic_id: &str,
        score: f64,
        minutes: Option<f64>,
    ) -> PathResult<()> {
        validate_id(learner_id, "learner_id")?;
        validate_id(topic_id, "topic_id")?;
        let score = validate_score(score)?;
        let minutes = minutes.map(validate_time_spent).transpose()?;

        if !self.graph.contains(topic_id) {
            tracing::warn!(learner_id, topic_id, "progress recorded for unknown topic");
        }

        self.store.update(learner_id, |record| {
            let outcome = apply_score(record, &self.graph, &self.config.thresholds, topic_id, score);
            if let Some(minutes) = minutes {
                record.record_completion_time(minutes);
            }

            let skill = record.skill_level.unwrap_or(self.config.fallback_skill_level);
            if let Some(current) = record.current_topic.clone() {
                record.recommended_path = self.optimizer.compute_path(
                    &current,
                    &record.completed_topics,
                    &record.struggled_topics,
                    skill,
                );
            }

            tracing::info!(
                learner_id,
                topic_id,
                score,
                outcome = ?outcome,
                path_length = record.recommended_path.len(),
                "progress updated"
            );
        });
        Ok(())
    }

    pub fn adjust_difficulty(
        &self,
        learner_id: &str,
        topic_id: &str,
        score: f64,
        time_spent_minutes: f64,
        attempts: u32,
    ) -> PathResult<DifficultyAdjustment> {
        validate_id(learner_id, "learner_id")?;
        validate_id(topic_id, "topic_id")?;
        let score = validate_score(score)?;
        let time_spent = validate_time_spent(time_spent_minutes)?;

        let adjustment = self.store.update(learner_id, |record| {
            record.touch();
            let performance = record.performance.entry(topic_id.to_string()).or_default();
            self.adjuster
                .adjust(topic_id, performance, score, time_spent, attempts)
        });

        tracing::info!(
            learner_id,
            topic_id,
            previous = adjustment.previous_difficulty,
            new = adjustment.new_difficulty,
            "difficulty adjusted"
        );
        Ok(adjustment)
    }

    pub fn difficulty_for(&self, learner_id: &str, topic_id: &str) -> f64 {
        self.store
            .snapshot(learner_id)
            .and_then(|record| record.performance.get(topic_id).and_then(|p| p.difficulty))
            .unwrap_or(self.config.difficulty.default_difficulty)
    }

    pub fn get_prerequisites(&self, topic_id: &str) -> Vec<String> {
        self.graph.prerequisites(topic_id).to_vec()
    }

    pub fn get_next_topics(&self, topic_id: &str) -> Vec<String> {
        self.graph.next_topics(topic_id).to_vec()
    }

    pub fn get_remedial_content(&self, topic_id: &str) -> Vec<String> {
        self.graph.remedial_content(topic_id).to_vec()
    }

    pub fn get_practice_exercises(&self, topic_id: &str) -> Vec<String> {
        self.graph.practice_exercises(topic_id).to_vec()
    }

    pub fn get_progress(&self, learner_id: &str) -> Option<ProgressRecord> {
        self.store.snapshot(learner_id)
    }

    pub fn cached_path(&self, learner_id: &str) -> Option<Vec<String>> {
        self.store
            .snapshot(learner_id)
            .map(|record| record.recommended_path)
    }

    pub fn project_path(&self, learner_id: &str) -> Option<PathProjection> {
        let record = self.store.snapshot(learner_id)?;
        let skill = record.skill_level.unwrap_or(self.config.fallback_skill_level);
        Some(
            self.projector
                .project(&record, &record.recommended_path, skill, &self.optimizer),
        )
    }

    pub fn reset_learner(&self, learner_id: &str) -> bool {
        let removed = self.store.remove(learner_id);
        if removed {
            tracing::info!(learner_id, "learner progress reset");
        }
        removed
    }

    pub fn learner_ids(&self) -> Vec<String> {
        self.store.learner_ids()
    }
}
