//! classprune - find the Java classes that can go along with a set of targets
//!
//! Given the fully qualified names of classes to delete, this library works
//! out which other project classes become dead once those targets are gone,
//! and never proposes a class that surviving code still needs.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! 1. **File Discovery** - Find all .java files under the project root
//! 2. **Scan** - Parse every file in parallel with tree-sitter and catalog
//!    the top-level classes it declares
//! 3. **Extraction** - Resolve the type names each class mentions into a
//!    class-to-class dependency graph
//! 4. **Liveness** - Compute everything reachable from the targets, then keep
//!    whatever is still used from outside until nothing changes
//! 5. **Reporting / Deletion** - Print the result or remove the files

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod parser;
pub mod pipeline;
pub mod pool;
pub mod refactor;
pub mod report;

pub use analysis::{LivenessAnalyzer, LivenessMode, LivenessReport};
pub use catalog::{Unit, UnitCatalog};
pub use config::Config;
pub use discovery::FileFinder;
pub use error::PipelineError;
pub use graph::{DependencyGraph, ResolutionStrategy, ReverseGraph};
pub use pipeline::{Analysis, Pipeline};
pub use refactor::{DeletionPlan, DeletionSummary, SafeDeleter};
pub use report::{ReportFormat, Reporter};
