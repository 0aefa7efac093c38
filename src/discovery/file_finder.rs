use crate::config::Config;
use crate::error::PipelineError;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Extension of the source units we analyze
pub const SOURCE_EXTENSION: &str = "java";

/// A discovered source file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    /// Path to the file
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Check whether a path looks like a source unit
    pub fn is_source(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
    }

    /// Load and return owned contents
    pub fn read_contents(&self) -> std::io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

/// File finder for discovering source files in a project
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Recursively find all source files below `root`.
    ///
    /// A missing root or a directory that cannot be walked fails the whole
    /// discovery: analyzing an incomplete file set could mark live classes as
    /// dead.
    pub fn find_files(&self, root: &Path) -> Result<Vec<SourceFile>, PipelineError> {
        if !root.is_dir() {
            return Err(PipelineError::RootNotFound(root.to_path_buf()));
        }

        debug!("Scanning for files in: {}", root.display());

        let walker = WalkBuilder::new(root)
            .hidden(true)           // Skip hidden files
            .git_ignore(true)       // Respect .gitignore
            .git_global(false)
            .git_exclude(true)      // Respect .git/info/exclude
            .ignore(true)           // Respect .ignore files
            .parents(false)
            .follow_links(false)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| PipelineError::Walk {
                path: root.to_path_buf(),
                source,
            })?;

            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let path = entry.path();
            if !SourceFile::is_source(path) {
                continue;
            }

            // Globs apply below the root, whatever directory the project sits in
            let relative = path.strip_prefix(root).unwrap_or(path);
            if self.config.should_exclude(relative) {
                trace!("Excluding: {}", path.display());
                continue;
            }

            trace!("Found source file: {}", path.display());
            files.push(SourceFile::new(path.to_path_buf()));
        }

        debug!("Found {} files", files.len());
        Ok(files)
    }
}
