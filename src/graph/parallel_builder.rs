// Parallel graph builder: scan stage, barrier, extraction stage, barrier

use super::{DependencyExtractor, DependencyGraph, GraphAccumulator};
use crate::catalog::{CatalogBuilder, Unit, UnitCatalog};
use crate::config::Config;
use crate::discovery::SourceFile;
use crate::error::{PipelineError, Stage};
use crate::parser::{JavaParser, ParsedFile, Parser as SourceParser};
use crate::pool::WorkerPool;
use dashmap::DashMap;
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A source file that contributed nothing because it could not be read or
/// parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Frozen result of both stages
#[derive(Debug)]
pub struct BuildOutput {
    pub catalog: UnitCatalog,
    pub graph: DependencyGraph,
    /// Number of files handed to the scan stage
    pub files: usize,
    /// Sorted by path
    pub skipped: Vec<SkippedFile>,
}

/// Builds the catalog and dependency graph on a bounded worker pool
pub struct ParallelGraphBuilder<'a> {
    config: &'a Config,
    progress: Option<ProgressBar>,
}

impl<'a> ParallelGraphBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Tick a progress bar once per file in each stage
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn build(&self, files: Vec<SourceFile>) -> Result<BuildOutput, PipelineError> {
        let pool = WorkerPool::new(
            self.config.workers.thread_count(),
            Duration::from_secs(self.config.workers.timeout_secs),
        )?;
        let file_count = files.len();

        info!(
            "Scanning {} files on {} workers...",
            file_count,
            pool.threads()
        );
        let (catalog, parsed, skipped) = self.scan(&pool, files)?;
        info!(
            "Catalog holds {} units ({} files skipped)",
            catalog.len(),
            skipped.len()
        );

        info!("Extracting dependencies...");
        let catalog = Arc::new(catalog);
        let graph = self.extract(&pool, Arc::clone(&catalog), parsed)?;
        info!(
            "Dependency graph: {} units, {} references",
            graph.unit_count(),
            graph.reference_count()
        );

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        let catalog = Arc::try_unwrap(catalog).unwrap_or_else(|shared| (*shared).clone());

        Ok(BuildOutput {
            catalog,
            graph,
            files: file_count,
            skipped,
        })
    }

    /// Parse every file once, register its units and keep the parse for the
    /// extraction stage
    fn scan(
        &self,
        pool: &WorkerPool,
        files: Vec<SourceFile>,
    ) -> Result<(UnitCatalog, Vec<Arc<ParsedFile>>, Vec<SkippedFile>), PipelineError> {
        let builder = Arc::new(CatalogBuilder::new());
        let parsed: Arc<DashMap<PathBuf, Arc<ParsedFile>>> = Arc::new(DashMap::new());
        let skipped: Arc<DashMap<PathBuf, String>> = Arc::new(DashMap::new());

        {
            let builder = Arc::clone(&builder);
            let parsed = Arc::clone(&parsed);
            let skipped = Arc::clone(&skipped);
            let progress = self.progress.clone();

            pool.run(Stage::Scan, files, move |file: &SourceFile| {
                match scan_file(file) {
                    Ok(result) => {
                        for declared in &result.units {
                            builder.register(Unit {
                                qualified_name: declared.qualified_name.clone(),
                                package: result.package.clone(),
                                kind: declared.kind,
                                file: result.path.clone(),
                                line: declared.line,
                            });
                        }
                        parsed.insert(result.path.clone(), Arc::new(result));
                    }
                    Err(reason) => {
                        warn!("Skipping {}: {}", file.path.display(), reason);
                        skipped.insert(file.path.clone(), reason);
                    }
                }
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
            })?;
        }

        let builder = Arc::try_unwrap(builder).unwrap_or_else(|shared| (*shared).clone());
        let catalog = builder.freeze();

        let mut files: Vec<Arc<ParsedFile>> = parsed.iter().map(|e| Arc::clone(e.value())).collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let mut skipped: Vec<SkippedFile> = skipped
            .iter()
            .map(|e| SkippedFile {
                path: e.key().clone(),
                reason: e.value().clone(),
            })
            .collect();
        skipped.sort_by(|a, b| a.path.cmp(&b.path));

        Ok((catalog, files, skipped))
    }

    fn extract(
        &self,
        pool: &WorkerPool,
        catalog: Arc<UnitCatalog>,
        files: Vec<Arc<ParsedFile>>,
    ) -> Result<DependencyGraph, PipelineError> {
        if let Some(pb) = &self.progress {
            pb.set_position(0);
            pb.set_length(files.len() as u64);
        }

        let accumulator = Arc::new(GraphAccumulator::new());

        {
            let accumulator = Arc::clone(&accumulator);
            let catalog = Arc::clone(&catalog);
            let strategy = self.config.resolution;
            let excluded = self.config.excluded_namespaces.clone();
            let count_imports = self.config.count_imports;
            let progress = self.progress.clone();

            pool.run(Stage::Extract, files, move |file: &Arc<ParsedFile>| {
                let extractor = DependencyExtractor::new(&catalog, strategy, &excluded)
                    .with_imports(count_imports);

                for unit in &file.units {
                    // A duplicate declaration only counts from the file the catalog kept
                    if catalog.location(&unit.qualified_name) != Some(file.path.as_path()) {
                        debug!(
                            "Ignoring shadowed declaration of {} in {}",
                            unit.qualified_name,
                            file.path.display()
                        );
                        continue;
                    }
                    accumulator.insert(unit.qualified_name.clone(), extractor.extract(file, unit));
                }

                if let Some(pb) = &progress {
                    pb.inc(1);
                }
            })?;
        }

        let accumulator = Arc::try_unwrap(accumulator).unwrap_or_else(|shared| (*shared).clone());
        Ok(accumulator.freeze(&catalog))
    }
}

/// Read and parse one file; any failure is turned into a skip reason
fn scan_file(file: &SourceFile) -> Result<ParsedFile, String> {
    let contents = file.read_contents().map_err(|e| e.to_string())?;
    JavaParser::new()
        .parse(&file.path, &contents)
        .map_err(|e| e.to_string())
}
