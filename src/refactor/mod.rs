// Deletion executor: plan files from a liveness report, then remove them

mod plan;
mod safe_delete;
mod undo;

pub use plan::{path_for_name, DeletionPlan, PlannedFile, SharedFile};
pub use safe_delete::{DeletionSummary, SafeDeleter};
pub use undo::UndoScript;
