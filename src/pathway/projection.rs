use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::pathway::graph::KnowledgeGraph;
use crate::pathway::optimizer::PathOptimizer;
use crate::pathway::types::{ProgressRecord, SkillLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Completed,
    Struggled,
    Current,
    Recommended,
    Available,
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Prerequisite,
    Next,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedNode {
    pub id: String,
    pub name: String,
    pub difficulty: u8,
    pub estimated_minutes: u32,
    pub status: NodeStatus,
    pub path_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathMetrics {
    pub total_minutes: u32,
    pub completed_minutes: u32,
    pub remaining_minutes: u32,
    pub progress: f64,
    pub struggled_count: usize,
    pub average_completion_minutes: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativePath {
    pub via: String,
    pub sequence: Vec<String>,
    pub total_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathProjection {
    pub learner_id: String,
    pub current_topic: Option<String>,
    pub skill_level: SkillLevel,
    pub path: Vec<String>,
    pub nodes: Vec<ProjectedNode>,
    pub edges: Vec<ProjectedEdge>,
    pub metrics: PathMetrics,
    pub alternatives: Vec<AlternativePath>,
}

pub struct PathProjector {
    graph: Arc<KnowledgeGraph>,
    alternative_count: usize,
}

impl PathProjector {
    pub fn new(graph: Arc<KnowledgeGraph>, alternative_count: usize) -> Self {
        Self {
            graph,
            alternative_count,
        }
    }

    pub fn project(
        &self,
        record: &ProgressRecord,
        path: &[String],
        skill: SkillLevel,
        optimizer: &PathOptimizer,
    ) -> PathProjection {
        let positions: HashMap<&str, usize> = path
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.as_str(), idx))
            .collect();

        let nodes = self
            .graph
            .topic_ids()
            .iter()
            .filter_map(|id| self.graph.get_node(id))
            .map(|node| ProjectedNode {
                id: node.id.clone(),
                name: node.name.clone(),
                difficulty: node.difficulty,
                estimated_minutes: node.estimated_minutes,
                status: self.status_of(&node.id, record, positions.contains_key(node.id.as_str())),
                path_index: positions.get(node.id.as_str()).copied(),
            })
            .collect();

        PathProjection {
            learner_id: record.learner_id.clone(),
            current_topic: record.current_topic.clone(),
            skill_level: skill,
            path: path.to_vec(),
            nodes,
            edges: self.edges(),
            metrics: self.metrics(record, path),
            alternatives: self.alternatives(record, path, skill, optimizer),
        }
    }

    fn status_of(&self, id: &str, record: &ProgressRecord, in_path: bool) -> NodeStatus {
        if record.completed_topics.contains(id) {
            NodeStatus::Completed
        } else if record.struggled_topics.contains(id) {
            NodeStatus::Struggled
        } else if record.current_topic.as_deref() == Some(id) {
            NodeStatus::Current
        } else if in_path {
            NodeStatus::Recommended
        } else if self
            .graph
            .prerequisites(id)
            .iter()
            .all(|prereq| record.completed_topics.contains(prereq))
        {
            NodeStatus::Available
        } else {
            NodeStatus::Locked
        }
    }

    fn edges(&self) -> Vec<ProjectedEdge> {
        let mut edges = Vec::new();
        for id in self.graph.topic_ids() {
            for prereq in self.graph.prerequisites(id) {
                edges.push(ProjectedEdge {
                    from: prereq.clone(),
                    to: id.clone(),
                    kind: EdgeKind::Prerequisite,
                });
            }
            for next in self.graph.next_topics(id) {
                edges.push(ProjectedEdge {
                    from: id.clone(),
                    to: next.clone(),
                    kind: EdgeKind::Next,
                });
            }
        }
        edges
    }

    fn minutes(&self, ids: &[String]) -> u32 {
        ids.iter()
            .filter_map(|id| self.graph.get_node(id))
            .map(|node| node.estimated_minutes)
            .sum()
    }

    fn metrics(&self, record: &ProgressRecord, path: &[String]) -> PathMetrics {
        let completed: Vec<String> = path
            .iter()
            .filter(|id| record.completed_topics.contains(*id))
            .cloned()
            .collect();
        let total_minutes = self.minutes(path);
        let completed_minutes = self.minutes(&completed);
        let progress = if path.is_empty() {
            0.0
        } else {
            completed.len() as f64 / path.len() as f64
        };

        PathMetrics {
            total_minutes,
            completed_minutes,
            remaining_minutes: total_minutes.saturating_sub(completed_minutes),
            progress,
            struggled_count: record.struggled_topics.len(),
            average_completion_minutes: record.average_completion_minutes,
        }
    }

    /// Branches off the current topic's later next-topics. When those run short, topics
    /// already unlocked by the learner's completions fill in, in topological order.
    fn alternatives(
        &self,
        record: &ProgressRecord,
        path: &[String],
        skill: SkillLevel,
        optimizer: &PathOptimizer,
    ) -> Vec<AlternativePath> {
        let Some(current) = record.current_topic.as_deref() else {
            return Vec::new();
        };

        let mut vias: Vec<&String> = self
            .graph
            .next_topics(current)
            .iter()
            .skip(1)
            .take(self.alternative_count)
            .collect();

        if vias.len() < self.alternative_count {
            let fallback: Vec<&String> = self
                .graph
                .topological_order()
                .iter()
                .filter(|id| {
                    id.as_str() != current
                        && !record.completed_topics.contains(*id)
                        && !path.contains(*id)
                        && !vias.contains(id)
                        && optimizer.offered_at(id, skill)
                        && self
                            .graph
                            .prerequisites(id)
                            .iter()
                            .all(|prereq| record.completed_topics.contains(prereq))
                })
                .take(self.alternative_count - vias.len())
                .collect();
            vias.extend(fallback);
        }

        vias.into_iter()
            .map(|via| {
                let sequence = optimizer.compute_path(
                    via,
                    &record.completed_topics,
                    &record.struggled_topics,
                    skill,
                );
                AlternativePath {
                    via: via.clone(),
                    total_minutes: self.minutes(&sequence),
                    sequence,
                }
            })
            .collect()
    }
}
