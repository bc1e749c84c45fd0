pub mod snapshot;
pub mod sources;

pub use snapshot::{
    build_progress_snapshot, remaining_days, resolve_hours_required, resolve_step_hours,
    ProgressSnapshot, SnapshotInput,
};
pub use sources::{CommitmentSources, Source, SourceKind};
