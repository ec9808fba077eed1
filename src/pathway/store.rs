use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::pathway::config::ProgressThresholds;
use crate::pathway::graph::KnowledgeGraph;
use crate::pathway::types::ProgressRecord;

/// Backing storage for per-learner progress.
///
/// `update` must run the closure with exclusive access to that learner's record and
/// must not block updates for other learners.
pub trait ProgressRepository: Send + Sync {
    fn update<R, F>(&self, learner_id: &str, f: F) -> R
    where
        F: FnOnce(&mut ProgressRecord) -> R;

    fn snapshot(&self, learner_id: &str) -> Option<ProgressRecord>;

    fn remove(&self, learner_id: &str) -> bool;

    fn learner_ids(&self) -> Vec<String>;
}

#[derive(Default)]
pub struct InMemoryProgressStore {
    records: RwLock<HashMap<String, Arc<Mutex<ProgressRecord>>>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, learner_id: &str) -> Arc<Mutex<ProgressRecord>> {
        if let Some(record) = self.records.read().get(learner_id) {
            return Arc::clone(record);
        }
        let mut records = self.records.write();
        let record = records.entry(learner_id.to_string()).or_insert_with(|| {
            tracing::debug!(learner_id, "progress record created");
            Arc::new(Mutex::new(ProgressRecord::new(learner_id)))
        });
        Arc::clone(record)
    }
}

impl ProgressRepository for InMemoryProgressStore {
    fn update<R, F>(&self, learner_id: &str, f: F) -> R
    where
        F: FnOnce(&mut ProgressRecord) -> R,
    {
        let record = self.entry(learner_id);
        let mut guard = record.lock();
        f(&mut *guard)
    }

    fn snapshot(&self, learner_id: &str) -> Option<ProgressRecord> {
        let record = self.records.read().get(learner_id).map(Arc::clone)?;
        let guard = record.lock();
        Some(guard.clone())
    }

    fn remove(&self, learner_id: &str) -> bool {
        self.records.write().remove(learner_id).is_some()
    }

    fn learner_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressOutcome {
    Completed,
    Struggled,
    Unchanged,
}

/// Applies one scored attempt to the record's completed/struggled sets and current topic.
pub fn apply_score(
    record: &mut ProgressRecord,
    graph: &KnowledgeGraph,
    thresholds: &ProgressThresholds,
    topic_id: &str,
    score: f64,
) -> ProgressOutcome {
    record.scores.insert(topic_id.to_string(), score);
    record.touch();

    if record.current_topic.is_none() {
        record.current_topic = Some(topic_id.to_string());
    }

    if score >= thresholds.completed {
        record.mark_completed(topic_id);
        if record.current_topic.as_deref() == Some(topic_id) {
            if let Some(next) = graph.next_topics(topic_id).first() {
                tracing::debug!(learner_id = %record.learner_id, from = topic_id, to = %next, "current topic advanced");
                record.current_topic = Some(next.clone());
            }
        }
        ProgressOutcome::Completed
    } else if score < thresholds.struggled {
        record.mark_struggled(topic_id);
        ProgressOutcome::Struggled
    } else {
        ProgressOutcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathway::catalog::{Catalog, TopicEntry};

    fn graph() -> KnowledgeGraph {
        KnowledgeGraph::from_catalog(Catalog::new(vec![
            TopicEntry::new("variables", 1, 15).leads_to(&["functions", "loops"]),
            TopicEntry::new("functions", 3, 30).requires(&["variables"]),
            TopicEntry::new("loops", 2, 30).requires(&["variables"]),
        ]))
        .unwrap()
    }

    #[test]
    fn test_store_creates_on_first_touch() {
        let store = InMemoryProgressStore::new();
        assert!(store.snapshot("u1").is_none());
        store.update("u1", |record| record.current_topic = Some("loops".into()));
        let snap = store.snapshot("u1").unwrap();
        assert_eq!(snap.current_topic.as_deref(), Some("loops"));
        assert_eq!(store.learner_ids(), vec!["u1".to_string()]);
        assert!(store.remove("u1"));
        assert!(!store.remove("u1"));
    }

    #[test]
    fn test_high_score_completes_and_advances() {
        let graph = graph();
        let thresholds = ProgressThresholds::default();
        let mut record = ProgressRecord::new("u1");
        record.current_topic = Some("variables".into());

        let outcome = apply_score(&mut record, &graph, &thresholds, "variables", 0.9);
        assert_eq!(outcome, ProgressOutcome::Completed);
        assert!(record.completed_topics.contains("variables"));
        assert_eq!(record.current_topic.as_deref(), Some("functions"));
    }

    #[test]
    fn test_low_score_moves_to_struggled() {
        let graph = graph();
        let thresholds = ProgressThresholds::default();
        let mut record = ProgressRecord::new("u1");

        apply_score(&mut record, &graph, &thresholds, "loops", 0.9);
        assert!(record.completed_topics.contains("loops"));
        apply_score(&mut record, &graph, &thresholds, "loops", 0.5);
        assert!(!record.completed_topics.contains("loops"));
        assert!(record.struggled_topics.contains("loops"));
    }

    #[test]
    fn test_middle_band_leaves_sets() {
        let graph = graph();
        let thresholds = ProgressThresholds::default();
        let mut record = ProgressRecord::new("u1");
        record.current_topic = Some("variables".into());

        let outcome = apply_score(&mut record, &graph, &thresholds, "functions", 0.7);
        assert_eq!(outcome, ProgressOutcome::Unchanged);
        assert!(record.completed_topics.is_empty());
        assert!(record.struggled_topics.is_empty());
        assert_eq!(record.scores.get("functions"), Some(&0.7));
        assert_eq!(record.current_topic.as_deref(), Some("variables"));
    }

    #[test]
    fn test_completing_other_topic_keeps_current() {
        let graph = graph();
        let thresholds = ProgressThresholds::default();
        let mut record = ProgressRecord::new("u1");
        record.current_topic = Some("loops".into());

        apply_score(&mut record, &graph, &thresholds, "variables", 0.95);
        assert_eq!(record.current_topic.as_deref(), Some("loops"));
    }

    #[test]
    fn test_distinct_learners_update_concurrently() {
        let store = Arc::new(InMemoryProgressStore::new());
        std::thread::scope(|scope| {
            for i in 0..8 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    let learner = format!("learner-{i}");
                    for n in 0..50 {
                        store.update(&learner, |record| {
                            record.scores.insert(format!("t{n}"), 0.5);
                        });
                    }
                });
            }
        });
        assert_eq!(store.learner_ids().len(), 8);
        for id in store.learner_ids() {
            assert_eq!(store.snapshot(&id).unwrap().scores.len(), 50);
        }
    }
}
