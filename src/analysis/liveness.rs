use crate::catalog::UnitCatalog;
use crate::config::namespace_matches;
use crate::graph::{DependencyGraph, ReverseGraph};
use petgraph::visit::{Bfs, VisitMap};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// How candidates reachable from the targets are admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LivenessMode {
    /// One pass: a candidate is admitted when every referencer is reachable
    /// from the targets
    SinglePass,
    /// Repeat until stable: a candidate is admitted only when every
    /// referencer is itself deleted
    #[default]
    Fixpoint,
}

/// Why a reachable candidate stays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetainReason {
    /// Lives in a reserved namespace
    Reserved,
    /// Something that survives still references it
    Referenced,
    /// Shares its file with a unit that survives
    SharedFile,
}

impl RetainReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetainReason::Reserved => "reserved namespace",
            RetainReason::Referenced => "still referenced",
            RetainReason::SharedFile => "shares a file with a surviving unit",
        }
    }
}

impl std::fmt::Display for RetainReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate reachable from the targets that is kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedUnit {
    pub name: String,
    pub reason: RetainReason,
    /// Surviving units that reference it, sorted
    pub referenced_by: Vec<String>,
}

/// A target that is deleted although surviving code still references it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillReferenced {
    pub target: String,
    pub referenced_by: Vec<String>,
}

/// Outcome of one liveness analysis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivenessReport {
    /// Deletable unit → owning file
    pub deletable: BTreeMap<String, PathBuf>,
    /// Targets not in the catalog; only deletable by name
    pub absent_targets: BTreeSet<String>,
    /// Reachable candidates that are kept, sorted by name
    pub retained: Vec<RetainedUnit>,
    pub still_referenced: Vec<StillReferenced>,
    /// Targets and candidates excluded because of their namespace
    pub reserved_skipped: BTreeSet<String>,
    /// Size of the reachability closure
    pub candidates: usize,
    /// Filter rounds until nothing changed
    pub rounds: usize,
}

impl LivenessReport {
    pub fn is_deletable(&self, name: &str) -> bool {
        self.deletable.contains_key(name)
    }

    pub fn deletable_names(&self) -> impl Iterator<Item = &str> {
        self.deletable.keys().map(String::as_str)
    }
}

/// Decides which units can go once the targets are deleted.
///
/// Runs single-threaded over a frozen graph. Only units reachable from the
/// targets are ever candidates; orphaned code elsewhere is left alone.
pub struct LivenessAnalyzer<'a> {
    catalog: &'a UnitCatalog,
    graph: &'a DependencyGraph,
    reverse: ReverseGraph,
    mode: LivenessMode,
    reserved_namespaces: Vec<String>,
}

impl<'a> LivenessAnalyzer<'a> {
    pub fn new(catalog: &'a UnitCatalog, graph: &'a DependencyGraph) -> Self {
        Self {
            catalog,
            graph,
            reverse: graph.reverse(),
            mode: LivenessMode::default(),
            reserved_namespaces: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: LivenessMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_reserved(mut self, namespaces: Vec<String>) -> Self {
        self.reserved_namespaces = namespaces;
        self
    }

    fn is_reserved(&self, name: &str) -> bool {
        self.reserved_namespaces
            .iter()
            .any(|ns| namespace_matches(ns, name))
    }

    pub fn analyze(&self, targets: &[String]) -> LivenessReport {
        let mut report = LivenessReport::default();
        let targets: BTreeSet<&str> = targets.iter().map(String::as_str).collect();

        // Seed: cataloged targets outside the reserved namespaces
        let mut roots = Vec::new();
        let mut deletable: BTreeSet<&str> = BTreeSet::new();
        for &target in &targets {
            let cataloged = self.catalog.contains(target);
            if cataloged {
                roots.push(target);
            }
            if self.is_reserved(target) {
                warn!("Target {} is in a reserved namespace and will not be deleted", target);
                report.reserved_skipped.insert(target.to_string());
            } else if cataloged {
                deletable.insert(target);
            } else {
                debug!("Target {} is not declared in the project", target);
                report.absent_targets.insert(target.to_string());
            }
        }

        let reachable = self.reachable_from(&roots);
        report.candidates = reachable.len();

        let pool: BTreeSet<&str> = reachable
            .iter()
            .copied()
            .filter(|u| !deletable.contains(u))
            .collect();

        let mut blocked: BTreeSet<&str> = pool
            .iter()
            .copied()
            .filter(|u| self.initially_blocked(u, &reachable, &targets))
            .collect();

        // Targets whose file stays on disk keep what they use
        let mut pinned: BTreeSet<&str> = BTreeSet::new();
        if self.mode == LivenessMode::Fixpoint {
            pinned.extend(
                deletable
                    .iter()
                    .copied()
                    .filter(|t| self.file_mates(t).any(|m| !reachable.contains(m))),
            );
        }

        report.rounds = match self.mode {
            LivenessMode::SinglePass => 1,
            LivenessMode::Fixpoint => self.propagate(&pool, &deletable, &mut blocked, &mut pinned),
        };

        for &target in &pinned {
            warn!(
                "Target {} shares its file with surviving code; the file and what it uses are kept",
                target
            );
        }

        deletable.extend(pool.iter().copied().filter(|u| !blocked.contains(u)));

        // Reserved units never leave, however they were admitted
        deletable.retain(|u| {
            let reserved = self.is_reserved(u);
            if reserved {
                report.reserved_skipped.insert(u.to_string());
            }
            !reserved
        });

        for &unit in &reachable {
            if self.is_reserved(unit) {
                report.reserved_skipped.insert(unit.to_string());
            }
        }

        for &unit in &deletable {
            if let Some(path) = self.catalog.location(unit) {
                report.deletable.insert(unit.to_string(), path.to_path_buf());
            }
        }

        for &unit in pool.iter().filter(|u| !deletable.contains(*u) && !targets.contains(*u)) {
            let referenced_by = self.surviving_referencers(unit, &deletable, &pinned);
            let reason = if self.is_reserved(unit) {
                RetainReason::Reserved
            } else if !referenced_by.is_empty() {
                RetainReason::Referenced
            } else {
                RetainReason::SharedFile
            };
            report.retained.push(RetainedUnit {
                name: unit.to_string(),
                reason,
                referenced_by,
            });
        }

        for &target in targets.iter().filter(|t| deletable.contains(*t)) {
            let referenced_by = self.surviving_referencers(target, &deletable, &pinned);
            if !referenced_by.is_empty() {
                warn!(
                    "Target {} is still referenced by {}; deleting it will break them",
                    target,
                    referenced_by.join(", ")
                );
                report.still_referenced.push(StillReferenced {
                    target: target.to_string(),
                    referenced_by,
                });
            }
        }

        info!(
            "Liveness: {} candidates, {} deletable, {} retained after {} round(s)",
            report.candidates,
            report.deletable.len(),
            report.retained.len(),
            report.rounds
        );

        report
    }

    /// Units reachable from the roots via outgoing references, roots included
    fn reachable_from(&self, roots: &[&str]) -> BTreeSet<&'a str> {
        let inner = self.graph.inner();
        let mut starts = roots.iter().filter_map(|root| self.graph.node_index(root));
        let Some(first) = starts.next() else {
            return BTreeSet::new();
        };

        // One traversal with every root queued up front
        let mut bfs = Bfs::new(inner, first);
        for start in starts {
            if bfs.discovered.visit(start) {
                bfs.stack.push_back(start);
            }
        }

        let mut reachable = BTreeSet::new();
        while let Some(node) = bfs.next(inner) {
            let name = inner[node].as_str();
            if self.catalog.contains(name) {
                reachable.insert(name);
            }
        }
        reachable
    }

    fn initially_blocked(&self, unit: &str, reachable: &BTreeSet<&str>, targets: &BTreeSet<&str>) -> bool {
        if self.is_reserved(unit) {
            return true;
        }

        let outside = |v: &str| match self.mode {
            LivenessMode::SinglePass => !reachable.contains(v) && !targets.contains(v),
            LivenessMode::Fixpoint => !reachable.contains(v),
        };

        if let Some(external) = self
            .reverse
            .referencers_of(unit)
            .find(|&v| v != unit && outside(v))
        {
            debug!("{} is kept: referenced by {}", unit, external);
            return true;
        }

        if self.mode == LivenessMode::Fixpoint {
            if let Some(mate) = self.file_mates(unit).find(|&m| outside(m)) {
                debug!("{} is kept: its file also declares {}", unit, mate);
                return true;
            }
        }

        false
    }

    /// Block everything a blocked unit references or shares a file with,
    /// until nothing changes. A seeded target sharing a file with a blocked
    /// unit is pinned: its file survives, so its dependencies are blocked
    /// too. Returns the number of rounds.
    fn propagate<'p>(
        &self,
        pool: &BTreeSet<&'p str>,
        seeded: &BTreeSet<&'p str>,
        blocked: &mut BTreeSet<&'p str>,
        pinned: &mut BTreeSet<&'p str>,
    ) -> usize {
        let mut frontier: Vec<&str> = blocked.iter().chain(pinned.iter()).copied().collect();
        let mut rounds = 1;

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for unit in frontier {
                for dependency in self.graph.dependencies_of(unit) {
                    if let Some(&candidate) = pool.get(dependency) {
                        if blocked.insert(candidate) {
                            debug!("{} is kept: used by retained {}", candidate, unit);
                            next.push(candidate);
                        }
                    }
                }
                for mate in self.file_mates(unit) {
                    if let Some(&candidate) = pool.get(mate) {
                        if blocked.insert(candidate) {
                            debug!("{} is kept: its file also declares {}", candidate, unit);
                            next.push(candidate);
                        }
                    } else if let Some(&target) = seeded.get(mate) {
                        if pinned.insert(target) {
                            next.push(target);
                        }
                    }
                }
            }
            if !next.is_empty() {
                rounds += 1;
            }
            frontier = next;
        }

        rounds
    }

    fn file_mates<'s>(&'s self, unit: &'s str) -> impl Iterator<Item = &'s str> + 's {
        self.catalog
            .location(unit)
            .map(|file| self.catalog.units_in_file(file))
            .unwrap_or(&[])
            .iter()
            .map(String::as_str)
            .filter(move |&mate| mate != unit)
    }

    /// Referencers of `unit` that stay on disk, itself excluded
    fn surviving_referencers(&self, unit: &str, deletable: &BTreeSet<&str>, pinned: &BTreeSet<&str>) -> Vec<String> {
        self.reverse
            .referencers_of(unit)
            .filter(|&v| v != unit && (!deletable.contains(v) || pinned.contains(v)))
            .map(str::to_string)
            .collect()
    }
}
