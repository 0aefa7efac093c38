mod extractor;
mod parallel_builder;
mod reference;
mod resolver;

pub use extractor::{Dependencies, DependencyExtractor};
pub use parallel_builder::{BuildOutput, ParallelGraphBuilder, SkippedFile};
pub use reference::ReferenceKind;
pub use resolver::{ResolutionStrategy, Resolver};

use crate::catalog::UnitCatalog;
use dashmap::DashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Concurrent accumulator for per-unit extraction results
#[derive(Debug, Default, Clone)]
pub struct GraphAccumulator {
    edges: DashMap<String, Dependencies>,
}

impl GraphAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the dependencies of a unit; a second insert for the same unit
    /// replaces the first.
    pub fn insert(&self, unit: String, deps: Dependencies) {
        self.edges.insert(unit, deps);
    }

    /// Freeze into a read-only graph. Every cataloged unit gets a node, even
    /// without outgoing references. Must only be called once every
    /// extraction task has finished.
    pub fn freeze(self, catalog: &UnitCatalog) -> DependencyGraph {
        let mut graph = DependencyGraph::new();

        let mut names: Vec<&String> = catalog.names().collect();
        names.sort();
        for name in names {
            graph.add_unit(name);
        }

        let sorted: BTreeMap<String, Dependencies> = self.edges.into_iter().collect();
        for (from, deps) in &sorted {
            graph.add_unit(from);
            for (to, kind) in deps {
                if catalog.contains(to) {
                    graph.add_unit(to);
                    graph.add_reference(from, to, *kind);
                }
            }
        }

        graph
    }
}

/// Unit → referenced units, frozen after extraction
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Nodes are qualified unit names, edges are references
    inner: DiGraph<String, ReferenceKind>,

    /// Map from unit name to node index
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an edge list; every endpoint becomes a unit
    pub fn from_edges<'e>(edges: impl IntoIterator<Item = (&'e str, &'e str)>) -> Self {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_unit(from);
            graph.add_unit(to);
            graph.add_reference(from, to, ReferenceKind::Field);
        }
        graph
    }

    /// Add a unit, returning its node (existing units are not duplicated)
    pub fn add_unit(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(name) {
            return idx;
        }
        let idx = self.inner.add_node(name.to_string());
        self.node_map.insert(name.to_string(), idx);
        idx
    }

    /// Add a reference between two existing units; repeated edges collapse
    pub fn add_reference(&mut self, from: &str, to: &str, kind: ReferenceKind) {
        if let (Some(&from_idx), Some(&to_idx)) = (self.node_map.get(from), self.node_map.get(to)) {
            if self.inner.find_edge(from_idx, to_idx).is_none() {
                self.inner.add_edge(from_idx, to_idx, kind);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Units referenced by `name`, sorted
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.node_map.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<&str> = self
            .inner
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .map(|n| self.inner[n].as_str())
            .collect();
        deps.sort_unstable();
        deps.dedup();
        deps
    }

    /// All references as (from, to, kind)
    pub fn references(&self) -> impl Iterator<Item = (&str, &str, ReferenceKind)> {
        self.inner.edge_references().map(|edge| {
            (
                self.inner[edge.source()].as_str(),
                self.inner[edge.target()].as_str(),
                *edge.weight(),
            )
        })
    }

    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.inner.node_weights().map(String::as_str)
    }

    pub fn unit_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn reference_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Get node index for a unit
    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_map.get(name).copied()
    }

    /// Get the underlying petgraph for traversals
    pub fn inner(&self) -> &DiGraph<String, ReferenceKind> {
        &self.inner
    }

    /// Derive the reverse mapping (unit → units that reference it)
    pub fn reverse(&self) -> ReverseGraph {
        let mut referencers: HashMap<String, BTreeSet<String>> = self
            .units()
            .map(|name| (name.to_string(), BTreeSet::new()))
            .collect();

        for (from, to, _) in self.references() {
            referencers
                .entry(to.to_string())
                .or_default()
                .insert(from.to_string());
        }

        let reverse = ReverseGraph { referencers };
        debug_assert!(reverse.is_transpose_of(self), "reverse graph is not the transpose");
        reverse
    }
}

/// Unit → units that reference it; always derived from a [`DependencyGraph`]
#[derive(Debug, Default, Clone)]
pub struct ReverseGraph {
    referencers: HashMap<String, BTreeSet<String>>,
}

impl ReverseGraph {
    /// Units referencing `name`, sorted
    pub fn referencers_of(&self, name: &str) -> impl Iterator<Item = &str> {
        self.referencers
            .get(name)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Check that every edge appears in exactly one direction of each graph
    pub fn is_transpose_of(&self, graph: &DependencyGraph) -> bool {
        let forward_edges = graph.references().count();
        let reverse_edges: usize = self.referencers.values().map(BTreeSet::len).sum();
        if forward_edges != reverse_edges {
            return false;
        }
        graph.references().all(|(from, to, _)| {
            self.referencers
                .get(to)
                .is_some_and(|set| set.contains(from))
        })
    }
}
