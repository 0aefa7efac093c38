//! Liveness properties checked on hand-written and generated graphs.

use classprune::analysis::{LivenessAnalyzer, LivenessMode, LivenessReport};
use classprune::catalog::{Unit, UnitCatalog};
use classprune::graph::DependencyGraph;
use std::collections::{BTreeSet, VecDeque};

const RESERVED: &str = "com.example.tools";

fn catalog_for(graph: &DependencyGraph) -> UnitCatalog {
    UnitCatalog::from_units(graph.units().map(|u| Unit::new(u, format!("{}.java", u))))
}

fn analyze(graph: &DependencyGraph, targets: &[&str], mode: LivenessMode) -> LivenessReport {
    let catalog = catalog_for(graph);
    let targets: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
    LivenessAnalyzer::new(&catalog, graph)
        .with_mode(mode)
        .with_reserved(vec![RESERVED.to_string()])
        .analyze(&targets)
}

fn deletable(report: &LivenessReport) -> Vec<&str> {
    report.deletable_names().collect()
}

/// Small deterministic generator so the graphs are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn random_graph(seed: u64, units: usize, edges: usize) -> DependencyGraph {
    let mut rng = Lcg(seed);
    let name = |i: u64| {
        if i % 11 == 7 {
            format!("{}.Tool{}", RESERVED, i)
        } else {
            format!("app.C{}", i)
        }
    };

    let mut graph = DependencyGraph::new();
    for i in 0..units as u64 {
        graph.add_unit(&name(i));
    }
    for _ in 0..edges {
        let from = name(rng.below(units as u64));
        let to = name(rng.below(units as u64));
        graph.add_reference(&from, &to, classprune::graph::ReferenceKind::Field);
    }
    graph
}

fn reachable(graph: &DependencyGraph, targets: &[&str]) -> BTreeSet<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<String> = targets
        .iter()
        .filter(|t| graph.contains(t))
        .map(|t| t.to_string())
        .collect();
    while let Some(unit) = queue.pop_front() {
        if !seen.insert(unit.clone()) {
            continue;
        }
        for dep in graph.dependencies_of(&unit) {
            queue.push_back(dep.to_string());
        }
    }
    seen
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_chain() {
    let graph = DependencyGraph::from_edges([("A", "B"), ("B", "C")]);
    assert_eq!(deletable(&analyze(&graph, &["A"], LivenessMode::Fixpoint)), vec!["A", "B", "C"]);
}

#[test]
fn test_scenario_external_referencer() {
    let graph = DependencyGraph::from_edges([("A", "B"), ("X", "B")]);
    assert_eq!(deletable(&analyze(&graph, &["A"], LivenessMode::Fixpoint)), vec!["A"]);
}

#[test]
fn test_scenario_cycle() {
    let graph = DependencyGraph::from_edges([("A", "B"), ("B", "A")]);
    assert_eq!(deletable(&analyze(&graph, &["A"], LivenessMode::Fixpoint)), vec!["A", "B"]);
}

#[test]
fn test_scenario_external_tail() {
    let with_back_edge = DependencyGraph::from_edges([("A", "B"), ("B", "C"), ("C", "B"), ("Dext", "C")]);
    assert_eq!(
        deletable(&analyze(&with_back_edge, &["A"], LivenessMode::Fixpoint)),
        vec!["A"]
    );

    let without_back_edge = DependencyGraph::from_edges([("A", "B"), ("B", "C"), ("Dext", "C")]);
    assert_eq!(
        deletable(&analyze(&without_back_edge, &["A"], LivenessMode::Fixpoint)),
        vec!["A", "B"]
    );
}

#[test]
fn test_scenario_absent_target() {
    let graph = DependencyGraph::from_edges([("A", "B")]);
    let report = analyze(&graph, &["Missing"], LivenessMode::Fixpoint);

    assert!(report.deletable.is_empty());
    assert_eq!(report.candidates, 0);
    assert!(report.absent_targets.contains("Missing"));
}

// ============================================================================
// Properties on generated graphs
// ============================================================================

#[test]
fn test_properties_hold_on_generated_graphs() {
    for seed in 0..60u64 {
        let graph = random_graph(seed, 30, 45);
        let reverse = graph.reverse();
        let targets = ["app.C0", "app.C1", "app.C29"];
        let report = analyze(&graph, &targets, LivenessMode::Fixpoint);
        let closure = reachable(&graph, &targets);

        for unit in report.deletable_names() {
            // Closure soundness
            assert!(closure.contains(unit), "seed {}: {} not reachable", seed, unit);

            // Infrastructure invariant
            assert!(!unit.starts_with(RESERVED), "seed {}: reserved {} deleted", seed, unit);

            // Closure safety (targets may still be referenced; they are reported)
            if !targets.contains(&unit) {
                for referencer in reverse.referencers_of(unit) {
                    assert!(
                        referencer == unit || report.is_deletable(referencer),
                        "seed {}: {} deleted but used by {}",
                        seed,
                        unit,
                        referencer
                    );
                }
            }
        }

        // Targets in the catalog and outside reserved namespaces are always deleted
        for target in targets.iter().filter(|t| graph.contains(t)) {
            assert!(report.is_deletable(target), "seed {}: target {} kept", seed, target);
        }
    }
}

#[test]
fn test_analysis_is_idempotent() {
    for seed in 0..20u64 {
        let graph = random_graph(seed, 25, 40);
        let first = analyze(&graph, &["app.C3"], LivenessMode::Fixpoint);
        let second = analyze(&graph, &["app.C3"], LivenessMode::Fixpoint);
        assert_eq!(first, second, "seed {}", seed);
    }
}

#[test]
fn test_fixpoint_never_admits_more_than_single_pass() {
    for seed in 0..40u64 {
        let graph = random_graph(seed, 30, 45);
        let fixpoint = analyze(&graph, &["app.C0"], LivenessMode::Fixpoint);
        let single = analyze(&graph, &["app.C0"], LivenessMode::SinglePass);

        for unit in fixpoint.deletable_names() {
            assert!(single.is_deletable(unit), "seed {}: {}", seed, unit);
        }
        assert_eq!(single.rounds, 1);
    }
}

#[test]
fn test_long_chain_does_not_recurse() {
    let names: Vec<String> = (0..50_000).map(|i| format!("deep.C{}", i)).collect();
    let graph = DependencyGraph::from_edges(names.windows(2).map(|w| (w[0].as_str(), w[1].as_str())));

    let report = analyze(&graph, &["deep.C0"], LivenessMode::Fixpoint);
    assert_eq!(report.deletable.len(), 50_000);
}
