//! Path Optimizer
//!
//! Linearizes the prerequisite graph around the learner's current topic:
//! - unmet prerequisites first, deepest first
//! - then the current topic
//! - then forward topics breadth-first, filtered by skill level, each one
//!   preceded by any of its own prerequisites not yet completed or emitted
//! - forward topics that help a struggled topic jump ahead of their siblings

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use crate::pathway::config::PathConfig;
use crate::pathway::graph::KnowledgeGraph;
use crate::pathway::types::SkillLevel;

#[derive(Debug, Clone)]
pub struct PathOptimizer {
    graph: Arc<KnowledgeGraph>,
    config: PathConfig,
}

impl PathOptimizer {
    pub fn new(graph: Arc<KnowledgeGraph>, config: PathConfig) -> Self {
        Self { graph, config }
    }

    pub fn compute_path(
        &self,
        current_topic: &str,
        completed: &BTreeSet<String>,
        struggled: &BTreeSet<String>,
        skill: SkillLevel,
    ) -> Vec<String> {
        let closure = self.unmet_prerequisites(current_topic, completed);
        let mut scheduled: HashSet<String> = closure.iter().cloned().collect();
        scheduled.insert(current_topic.to_string());

        let mut queue: VecDeque<String> = closure.into();
        queue.push_back(current_topic.to_string());

        let mut emitted: HashSet<String> = HashSet::new();
        let mut path = Vec::new();

        while let Some(topic) = queue.pop_front() {
            if emitted.contains(&topic) {
                continue;
            }

            // a forward topic waits for its own unmet prerequisites
            scheduled.insert(topic.clone());
            let mut ready = Vec::new();
            self.collect_unmet(&topic, completed, &mut scheduled, &mut ready);
            ready.push(topic);

            for id in ready {
                if !emitted.insert(id.clone()) {
                    continue;
                }
                let candidates: Vec<&String> = self
                    .graph
                    .next_topics(&id)
                    .iter()
                    .filter(|next| self.offered_at(next, skill))
                    .collect();
                queue.extend(self.prioritize(candidates, struggled).into_iter().cloned());
                path.push(id);
            }
        }

        tracing::debug!(
            current_topic,
            skill = skill.as_str(),
            length = path.len(),
            "learning path computed"
        );
        path
    }

    /// Prerequisites of `topic` not yet completed, each emitted after its own unmet prerequisites.
    pub fn unmet_prerequisites(&self, topic: &str, completed: &BTreeSet<String>) -> Vec<String> {
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(topic.to_string());
        let mut out = Vec::new();
        self.collect_unmet(topic, completed, &mut visited, &mut out);
        out
    }

    fn collect_unmet(
        &self,
        topic: &str,
        completed: &BTreeSet<String>,
        visited: &mut HashSet<String>,
        out: &mut Vec<String>,
    ) {
        for prereq in self.graph.prerequisites(topic) {
            if completed.contains(prereq) || !visited.insert(prereq.clone()) {
                continue;
            }
            self.collect_unmet(prereq, completed, visited, out);
            out.push(prereq.clone());
        }
    }

    pub(crate) fn offered_at(&self, topic: &str, skill: SkillLevel) -> bool {
        self.graph
            .get_node(topic)
            .is_some_and(|node| self.config.allows(skill, node.difficulty))
    }

    /// Stable partition: helpful topics first, declared order kept within each group.
    fn prioritize<'a>(&self, candidates: Vec<&'a String>, struggled: &BTreeSet<String>) -> Vec<&'a String> {
        if struggled.is_empty() {
            return candidates;
        }
        let (mut helpful, rest): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|candidate| self.helps_struggled(candidate, struggled));
        helpful.extend(rest);
        helpful
    }

    pub fn helps_struggled(&self, candidate: &str, struggled: &BTreeSet<String>) -> bool {
        let Some(meta) = self.graph.get_metadata(candidate) else {
            return false;
        };

        struggled.iter().any(|topic| {
            let needle = topic.to_lowercase();
            meta.required_for.iter().any(|id| id == topic)
                || meta
                    .building_blocks
                    .iter()
                    .chain(meta.remedial_content.iter())
                    .chain(meta.common_struggles.iter())
                    .any(|text| text.to_lowercase().contains(&needle))
        })
    }
}
