// Cycle detector - finds groups of units that only go away together
//
// A set of deletable units that reference each other in a ring has no
// deletion order that keeps the project compiling in between, so they are
// reported as a group.

use crate::graph::DependencyGraph;
use petgraph::algo::tarjan_scc;
use tracing::debug;

/// A dependency cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// Unit names, sorted
    pub members: Vec<String>,
}

impl CycleInfo {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

pub struct CycleDetector;

impl CycleDetector {
    pub fn new() -> Self {
        Self
    }

    /// Strongly connected components of two or more units whose members all
    /// satisfy `keep`.
    ///
    /// Returns cycles sorted by size (largest first), then by first member.
    pub fn find_cycles(&self, graph: &DependencyGraph, keep: impl Fn(&str) -> bool) -> Vec<CycleInfo> {
        let inner = graph.inner();

        let mut cycles: Vec<CycleInfo> = tarjan_scc(inner)
            .into_iter()
            .filter(|scc| scc.len() >= 2)
            .filter_map(|scc| {
                let mut members: Vec<String> = scc.iter().map(|&idx| inner[idx].clone()).collect();
                if !members.iter().all(|m| keep(m)) {
                    return None;
                }
                members.sort();
                Some(CycleInfo { members })
            })
            .collect();

        cycles.sort_by(|a, b| b.size().cmp(&a.size()).then_with(|| a.members.cmp(&b.members)));

        debug!("Found {} dependency cycles", cycles.len());
        cycles
    }
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new()
    }
}
