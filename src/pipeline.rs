//! End-to-end run: discover → scan → extract → analyze.
//!
//! Every stage finishes completely before the next one starts; a stage
//! failure aborts the run so that no analysis happens on partial data.

use crate::analysis::{CycleDetector, CycleInfo, LivenessAnalyzer, LivenessReport};
use crate::config::Config;
use crate::discovery::FileFinder;
use crate::error::PipelineError;
use crate::graph::{BuildOutput, ParallelGraphBuilder};
use crate::refactor::DeletionPlan;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Everything one run produced
#[derive(Debug)]
pub struct Analysis {
    pub root: PathBuf,
    /// Sorted, deduplicated
    pub targets: Vec<String>,
    pub build: BuildOutput,
    pub liveness: LivenessReport,
    /// Dependency cycles made only of deletable units
    pub cycles: Vec<CycleInfo>,
    pub elapsed: Duration,
}

impl Analysis {
    /// File-level deletion plan for this analysis
    pub fn plan(&self, config: &Config) -> DeletionPlan {
        DeletionPlan::build(
            &self.liveness,
            &self.build.catalog,
            &self.root,
            &config.source_roots,
        )
    }
}

pub struct Pipeline<'a> {
    config: &'a Config,
    show_progress: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn run(&self, root: &Path) -> Result<Analysis, PipelineError> {
        let start = Instant::now();

        let mut targets = self.config.targets.clone();
        targets.sort();
        targets.dedup();
        if targets.is_empty() {
            return Err(PipelineError::NoTargets);
        }
        for target in targets.iter().filter(|t| self.config.is_excluded_namespace(t)) {
            warn!("Target {} is in a library namespace and can never be found", target);
        }

        info!("Discovering files...");
        let files = FileFinder::new(self.config).find_files(root)?;
        info!("Found {} source files", files.len());

        let mut builder = ParallelGraphBuilder::new(self.config);
        if self.show_progress && !files.is_empty() {
            builder = builder.with_progress(progress_bar(files.len() as u64));
        }
        let build = builder.build(files)?;

        info!("Analyzing liveness of {} target(s)...", targets.len());
        let liveness = LivenessAnalyzer::new(&build.catalog, &build.graph)
            .with_mode(self.config.liveness)
            .with_reserved(self.config.reserved_namespaces.clone())
            .analyze(&targets);

        let cycles = CycleDetector::new().find_cycles(&build.graph, |unit| liveness.is_deletable(unit));

        Ok(Analysis {
            root: root.to_path_buf(),
            targets,
            build,
            liveness,
            cycles,
            elapsed: start.elapsed(),
        })
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
