mod cycles;
mod liveness;

pub use cycles::{CycleDetector, CycleInfo};
pub use liveness::{
    LivenessAnalyzer, LivenessMode, LivenessReport, RetainReason, RetainedUnit, StillReferenced,
};
