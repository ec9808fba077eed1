use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::pathway::catalog::{Catalog, TopicEntry};
use crate::pathway::error::CatalogError;
use crate::pathway::types::{TopicMetadata, TopicNode};

/// Read-only prerequisite graph over topics.
///
/// Built once at startup and shared behind an `Arc`. Lookups for unknown ids return
/// empty results instead of failing.
#[derive(Debug, Clone)]
pub struct KnowledgeGraph {
    nodes: HashMap<String, TopicNode>,
    metadata: HashMap<String, TopicMetadata>,
    declared_order: Vec<String>,
    topological_order: Vec<String>,
}

impl KnowledgeGraph {
    pub fn from_catalog(catalog: Catalog) -> Result<Self, CatalogError> {
        if catalog.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut graph = Self::from_entries_unchecked(catalog.topics)?;
        graph.validate_references()?;
        graph.topological_order = graph.compute_topological_order()?;

        tracing::info!(
            topics = graph.len(),
            "knowledge graph built and validated"
        );
        Ok(graph)
    }

    /// Indexes entries without reference or cycle checks. Only duplicate ids are rejected.
    pub(crate) fn from_entries_unchecked(entries: Vec<TopicEntry>) -> Result<Self, CatalogError> {
        let mut nodes = HashMap::with_capacity(entries.len());
        let mut metadata = HashMap::with_capacity(entries.len());
        let mut declared_order = Vec::with_capacity(entries.len());

        for entry in entries {
            let id = entry.node.id.clone();
            if nodes.contains_key(&id) {
                return Err(CatalogError::DuplicateTopic(id));
            }
            declared_order.push(id.clone());
            metadata.insert(id.clone(), entry.metadata);
            nodes.insert(id, entry.node);
        }

        Ok(Self {
            nodes,
            metadata,
            topological_order: declared_order.clone(),
            declared_order,
        })
    }

    fn validate_references(&self) -> Result<(), CatalogError> {
        for id in &self.declared_order {
            let node = &self.nodes[id];
            if !(1..=10).contains(&node.difficulty) {
                return Err(CatalogError::DifficultyOutOfRange {
                    topic: id.clone(),
                    difficulty: node.difficulty,
                });
            }

            let dangling = node
                .prerequisites
                .iter()
                .map(|target| ("prerequisite", target))
                .chain(node.next_topics.iter().map(|target| ("next topic", target)))
                .find(|(_, target)| !self.nodes.contains_key(*target));

            if let Some((relation, target)) = dangling {
                return Err(CatalogError::DanglingReference {
                    topic: id.clone(),
                    relation,
                    target: target.clone(),
                });
            }

            if let Some(meta) = self.metadata.get(id) {
                for target in &meta.required_for {
                    if !self.nodes.contains_key(target) {
                        tracing::warn!(topic = %id, target = %target, "requiredFor references unknown topic");
                    }
                }
            }
        }
        Ok(())
    }

    fn compute_topological_order(&self) -> Result<Vec<String>, CatalogError> {
        let mut dag: DiGraph<&str, ()> = DiGraph::with_capacity(self.len(), self.len() * 2);
        let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.len());

        for id in &self.declared_order {
            index.insert(id.as_str(), dag.add_node(id.as_str()));
        }
        for id in &self.declared_order {
            for prereq in &self.nodes[id].prerequisites {
                if let (Some(&from), Some(&to)) = (index.get(prereq.as_str()), index.get(id.as_str())) {
                    dag.add_edge(from, to, ());
                }
            }
        }

        petgraph::algo::toposort(&dag, None)
            .map(|order| order.into_iter().map(|idx| dag[idx].to_string()).collect())
            .map_err(|cycle| CatalogError::Cycle(dag[cycle.node_id()].to_string()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&TopicNode> {
        self.nodes.get(id)
    }

    pub fn get_metadata(&self, id: &str) -> Option<&TopicMetadata> {
        self.metadata.get(id)
    }

    pub fn prerequisites(&self, id: &str) -> &[String] {
        self.nodes
            .get(id)
            .map(|node| node.prerequisites.as_slice())
            .unwrap_or(&[])
    }

    pub fn next_topics(&self, id: &str) -> &[String] {
        self.nodes
            .get(id)
            .map(|node| node.next_topics.as_slice())
            .unwrap_or(&[])
    }

    pub fn remedial_content(&self, id: &str) -> &[String] {
        self.metadata
            .get(id)
            .map(|meta| meta.remedial_content.as_slice())
            .unwrap_or(&[])
    }

    pub fn practice_exercises(&self, id: &str) -> &[String] {
        self.metadata
            .get(id)
            .map(|meta| meta.practice_exercises.as_slice())
            .unwrap_or(&[])
    }

    /// Topic ids in catalog declaration order.
    pub fn topic_ids(&self) -> &[String] {
        &self.declared_order
    }

    /// Topic ids with every prerequisite ahead of its dependents.
    pub fn topological_order(&self) -> &[String] {
        &self.topological_order
    }

    /// All topics transitively required before `id`.
    pub fn prerequisite_closure(&self, id: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut stack: Vec<&str> = self.prerequisites(id).iter().map(String::as_str).collect();
        while let Some(topic) = stack.pop() {
            if seen.insert(topic.to_string()) {
                stack.extend(self.prerequisites(topic).iter().map(String::as_str));
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Catalog {
        Catalog::new(vec![
            TopicEntry::new("variables", 1, 15).leads_to(&["functions"]),
            TopicEntry::new("functions", 3, 30)
                .requires(&["variables"])
                .leads_to(&["objects"]),
            TopicEntry::new("objects", 4, 45).requires(&["functions"]),
        ])
    }

    #[test]
    fn test_lookups() {
        let graph = KnowledgeGraph::from_catalog(chain()).unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.prerequisites("functions"), ["variables".to_string()]);
        assert_eq!(graph.next_topics("functions"), ["objects".to_string()]);
        assert!(graph.get_node("objects").is_some());
    }

    #[test]
    fn test_unknown_ids_return_empty() {
        let graph = KnowledgeGraph::from_catalog(chain()).unwrap();
        assert!(graph.get_node("quantum").is_none());
        assert!(graph.prerequisites("quantum").is_empty());
        assert!(graph.next_topics("quantum").is_empty());
        assert!(graph.remedial_content("quantum").is_empty());
        assert!(graph.practice_exercises("quantum").is_empty());
    }

    #[test]
    fn test_topological_order_puts_prerequisites_first() {
        let catalog = Catalog::new(vec![
            TopicEntry::new("objects", 4, 45).requires(&["functions"]),
            TopicEntry::new("functions", 3, 30).requires(&["variables"]),
            TopicEntry::new("variables", 1, 15),
        ]);
        let graph = KnowledgeGraph::from_catalog(catalog).unwrap();
        let order = graph.topological_order();
        let pos = |id: &str| order.iter().position(|t| t == id).unwrap();
        assert!(pos("variables") < pos("functions"));
        assert!(pos("functions") < pos("objects"));
        assert_eq!(graph.topic_ids()[0], "objects");
    }

    #[test]
    fn test_cycle_rejected() {
        let catalog = Catalog::new(vec![
            TopicEntry::new("a", 1, 5).requires(&["c"]),
            TopicEntry::new("b", 1, 5).requires(&["a"]),
            TopicEntry::new("c", 1, 5).requires(&["b"]),
        ]);
        let err = KnowledgeGraph::from_catalog(catalog).unwrap_err();
        assert!(matches!(err, CatalogError::Cycle(_)));
    }

    #[test]
    fn test_self_prerequisite_rejected() {
        let catalog = Catalog::new(vec![TopicEntry::new("a", 1, 5).requires(&["a"])]);
        assert!(matches!(
            KnowledgeGraph::from_catalog(catalog),
            Err(CatalogError::Cycle(_))
        ));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let catalog = Catalog::new(vec![TopicEntry::new("a", 1, 5).leads_to(&["ghost"])]);
        match KnowledgeGraph::from_catalog(catalog).unwrap_err() {
            CatalogError::DanglingReference { topic, relation, target } => {
                assert_eq!(topic, "a");
                assert_eq!(relation, "next topic");
                assert_eq!(target, "ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_and_range_checks() {
        let dup = Catalog::new(vec![TopicEntry::new("a", 1, 5), TopicEntry::new("a", 2, 5)]);
        assert!(matches!(
            KnowledgeGraph::from_catalog(dup),
            Err(CatalogError::DuplicateTopic(_))
        ));

        let hard = Catalog::new(vec![TopicEntry::new("a", 11, 5)]);
        assert!(matches!(
            KnowledgeGraph::from_catalog(hard),
            Err(CatalogError::DifficultyOutOfRange { difficulty: 11, .. })
        ));

        assert!(matches!(
            KnowledgeGraph::from_catalog(Catalog::default()),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn test_prerequisite_closure() {
        let graph = KnowledgeGraph::from_catalog(chain()).unwrap();
        let closure = graph.prerequisite_closure("objects");
        assert!(closure.contains("variables"));
        assert!(closure.contains("functions"));
        assert!(!closure.contains("objects"));
    }

    #[test]
    fn test_builtin_curriculum_is_valid() {
        let graph = KnowledgeGraph::from_catalog(Catalog::builtin().unwrap()).unwrap();
        assert_eq!(graph.topological_order().len(), graph.len());
    }
}
