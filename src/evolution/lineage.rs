//! Append-only genealogy of every candidate an engine has created.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::schema::{
    Candidate, CandidateId, CandidateStatus, LineageEdge, LineageNode, LineageSnapshot, Strategy,
};

const ELIMINATED_MARK: &str = " (eliminated)";

/// Records nodes and parent-to-child edges. Nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct LineageTracker {
    nodes: BTreeMap<CandidateId, LineageNode>,
    edges: Vec<LineageEdge>,
}

fn node_label(id: CandidateId, score: f64, eliminated: bool) -> String {
    let mut label = format!("#{id} score={score:.1}");
    if eliminated {
        label.push_str(ELIMINATED_MARK);
    }
    label
}

impl LineageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node on first sight, otherwise refresh score, status and label.
    ///
    /// Returns `true` when the node was inserted.
    pub fn register_or_update(&mut self, candidate: &Candidate) -> bool {
        match self.nodes.get_mut(&candidate.id) {
            Some(node) => {
                let eliminated = node.label.ends_with(ELIMINATED_MARK);
                node.score = candidate.score;
                node.status = candidate.status;
                node.label = node_label(candidate.id, candidate.score, eliminated);
                false
            }
            None => {
                self.nodes.insert(
                    candidate.id,
                    LineageNode {
                        id: candidate.id,
                        label: node_label(candidate.id, candidate.score, false),
                        score: candidate.score,
                        status: candidate.status,
                    },
                );
                true
            }
        }
    }

    /// Record that a cut removed this candidate.
    pub fn mark_eliminated(&mut self, candidate: &Candidate) {
        let node = self
            .nodes
            .entry(candidate.id)
            .or_insert_with(|| LineageNode {
                id: candidate.id,
                label: String::new(),
                score: candidate.score,
                status: candidate.status,
            });
        node.score = candidate.score;
        node.status = CandidateStatus::Failed;
        node.label = node_label(candidate.id, candidate.score, true);
    }

    /// Append a derivation edge. Repeated calls append repeated edges.
    pub fn add_edge(&mut self, parent: CandidateId, child: CandidateId, strategy: Strategy) {
        self.edges.push(LineageEdge {
            source: parent,
            target: child,
            label: strategy,
        });
    }

    pub fn contains(&self, id: CandidateId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: CandidateId) -> Option<&LineageNode> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edges(&self) -> &[LineageEdge] {
        &self.edges
    }

    /// Edges pointing at `id`, in insertion order.
    pub fn edges_into(&self, id: CandidateId) -> impl Iterator<Item = &LineageEdge> {
        self.edges.iter().filter(move |e| e.target == id)
    }

    pub fn parents_of(&self, id: CandidateId) -> Vec<CandidateId> {
        self.edges_into(id).map(|e| e.source).collect()
    }

    pub fn children_of(&self, id: CandidateId) -> Vec<CandidateId> {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .map(|e| e.target)
            .collect()
    }

    /// All transitive ancestors of `id`, nearest first, each listed once.
    pub fn ancestry(&self, id: CandidateId) -> Vec<CandidateId> {
        let mut seen = HashSet::from([id]);
        let mut queue: VecDeque<CandidateId> = VecDeque::from([id]);
        let mut ancestors = Vec::new();

        while let Some(current) = queue.pop_front() {
            for parent in self.parents_of(current) {
                if seen.insert(parent) {
                    ancestors.push(parent);
                    queue.push_back(parent);
                }
            }
        }

        ancestors
    }

    /// Copy of the whole graph, or `None` if no node was ever registered.
    pub fn snapshot(&self) -> Option<LineageSnapshot> {
        if self.nodes.is_empty() {
            return None;
        }
        Some(LineageSnapshot {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.clone(),
        })
    }
}
