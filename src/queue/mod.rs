pub mod assembler;
pub mod buckets;
pub mod entries;
pub mod metrics;
pub mod providers;

pub use assembler::{dedupe_entries, ActionQueue, QueueAssembler, QueueOptions, DEFAULT_EMPTY_MESSAGE};
pub use buckets::{
    normalize_bucket_name, resolve_focus_bucket, resolve_queue_category, BucketComparator,
    FocusBucket, FocusBucketRegistry, ModeConfig, ModeOverride, DEFAULT_FOCUS_BUCKET,
    DEFAULT_FOCUS_MODE,
};
pub use entries::{
    collect_outstanding_entries, compare_commitments, create_auto_completed_entries,
    create_outstanding_entry, OutstandingInput, COMMITMENT_BUCKET,
};
pub use metrics::QueueMetrics;
pub use providers::{
    normalize_provider_entries, ActionProvider, ProviderContext, ProviderHandle, ProviderRegistry,
    ProviderResult,
};
