//! Lineage export format consumed by external visualization.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{CandidateId, CandidateStatus};

/// Reproduction operator that produced a child.
///
/// Also serves as the relation label on lineage edges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Exact payload copy of an optimal parent.
    Clone,
    /// Small perturbation of the prompt.
    MutateLight,
    /// Wholesale replacement of the prompts.
    MutateDrastic,
    /// Merge of two parents.
    Crossover,
    /// Fresh payload with no parent.
    RandomGenerate,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Clone,
        Strategy::MutateLight,
        Strategy::MutateDrastic,
        Strategy::Crossover,
        Strategy::RandomGenerate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Clone => "clone",
            Strategy::MutateLight => "mutate-light",
            Strategy::MutateDrastic => "mutate-drastic",
            Strategy::Crossover => "crossover",
            Strategy::RandomGenerate => "random-generate",
        }
    }

    /// Number of parents the operator consumes.
    pub fn arity(self) -> usize {
        match self {
            Strategy::RandomGenerate => 0,
            Strategy::Crossover => 2,
            _ => 1,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate as seen by the genealogy graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineageNode {
    pub id: CandidateId,
    pub label: String,
    pub score: f64,
    pub status: CandidateStatus,
}

/// A parent-to-child derivation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineageEdge {
    /// Parent id.
    pub source: CandidateId,
    /// Child id.
    pub target: CandidateId,
    /// Operator that produced the child.
    pub label: Strategy,
}

/// Immutable copy of the genealogy graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LineageSnapshot {
    pub nodes: Vec<LineageNode>,
    pub edges: Vec<LineageEdge>,
}

impl LineageSnapshot {
    /// Render as a Mermaid `graph TD` diagram.
    pub fn to_mermaid(&self) -> String {
        let mut graph = String::from("graph TD\n");
        for node in &self.nodes {
            let _ = writeln!(
                graph,
                "  {}[\"{}\"]",
                node.id,
                node.label.replace('"', "'")
            );
        }
        for edge in &self.edges {
            let _ = writeln!(
                graph,
                "  {} -->|{}| {}",
                edge.source, edge.label, edge.target
            );
        }
        graph
    }

    /// Write the export format as pretty JSON, creating parent directories.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    /// Load a previously exported snapshot.
    pub fn load_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LineageSnapshot {
        LineageSnapshot {
            nodes: vec![
                LineageNode {
                    id: 1,
                    label: "#1 score=80.0".to_string(),
                    score: 80.0,
                    status: CandidateStatus::Completed,
                },
                LineageNode {
                    id: 2,
                    label: "#2 score=0.0".to_string(),
                    score: 0.0,
                    status: CandidateStatus::Pending,
                },
            ],
            edges: vec![LineageEdge {
                source: 1,
                target: 2,
                label: Strategy::MutateLight,
            }],
        }
    }

    #[test]
    fn test_export_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["nodes"][0]["status"], "completed");
        assert_eq!(json["edges"][0]["source"], 1);
        assert_eq!(json["edges"][0]["target"], 2);
        assert_eq!(json["edges"][0]["label"], "mutate-light");
    }

    #[test]
    fn test_mermaid() {
        let diagram = sample().to_mermaid();
        assert!(diagram.starts_with("graph TD\n"));
        assert!(diagram.contains("  1[\"#1 score=80.0\"]"));
        assert!(diagram.contains("  1 -->|mutate-light| 2"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("lineage.json");

        let snapshot = sample();
        snapshot.save_json(&path).unwrap();
        let loaded = LineageSnapshot::load_json(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_strategy_arity() {
        assert_eq!(Strategy::RandomGenerate.arity(), 0);
        assert_eq!(Strategy::Clone.arity(), 1);
        assert_eq!(Strategy::Crossover.arity(), 2);

        for strategy in Strategy::ALL {
            let json = serde_json::to_value(strategy).unwrap();
            assert_eq!(json, strategy.as_str());
        }
    }
}
