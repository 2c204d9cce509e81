pub mod drift;
pub mod lifecycle;

pub use drift::{diff_configs, DriftDiff, DriftReport, DriftType};
pub use lifecycle::{ApplyOutcome, DestroyOutcome, LifecycleEngine, StatusReport};
