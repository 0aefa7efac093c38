mod loader;

pub use loader::{namespace_matches, Config, ReportConfig, WorkerConfig};
