pub mod definition;
pub mod entry;
pub mod modes;
pub mod state;

pub use definition::{Definition, DefinitionCatalog, DefinitionLookup};
pub use entry::{
    ActionHandler, ActionOutcome, AutoCompletedEntry, EntryAction, MetaTone, ProgressAction,
    QueueEntry,
};
pub use modes::{CompletionMode, PayoutSchedule};
pub use state::{
    AcceptedOffer, CommitmentInstance, DailySummary, GameState, HustleOffer, InstanceProgress,
    OfferMetadata, TimeBreakdownEntry,
};
