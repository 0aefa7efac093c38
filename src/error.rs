use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage that runs on the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scan,
    Extract,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Scan => "scan",
            Stage::Extract => "extraction",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures that abort the whole run.
///
/// Per-file problems never show up here: they are recorded as skipped files
/// and the pipeline carries on.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Project root does not exist or is not a directory: {0}")]
    RootNotFound(PathBuf),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),

    #[error("The {stage} stage did not finish within {secs}s; refusing to analyze a partial graph")]
    Timeout { stage: Stage, secs: u64 },

    #[error("A worker panicked during the {stage} stage")]
    WorkerPanicked { stage: Stage },

    #[error("No target classes given")]
    NoTargets,
}
