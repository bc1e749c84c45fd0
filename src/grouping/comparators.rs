//! Standard in-bucket orderings and the registry that wires them up.

use std::cmp::Ordering;

use crate::models::QueueEntry;
use crate::queue::{compare_commitments, FocusBucket, FocusBucketRegistry, ModeOverride};

/// Best money per hour first, then bigger payout, then shorter work.
pub fn compare_hustles(a: &QueueEntry, b: &QueueEntry) -> Ordering {
    b.money_per_hour
        .total_cmp(&a.money_per_hour)
        .then_with(|| b.payout.total_cmp(&a.payout))
        .then_with(|| a.duration_hours.total_cmp(&b.duration_hours))
        .then_with(|| a.order().cmp(&b.order()))
}

/// Closest to unlocking first; unknown requirements go last.
pub fn compare_upgrades(a: &QueueEntry, b: &QueueEntry) -> Ordering {
    let remaining = |entry: &QueueEntry| entry.upgrade_remaining.unwrap_or(f64::INFINITY);
    remaining(a)
        .total_cmp(&remaining(b))
        .then_with(|| a.duration_hours.total_cmp(&b.duration_hours))
        .then_with(|| a.order().cmp(&b.order()))
}

/// Register the commitment, hustle and upgrade comparators. Commitments are
/// pulled to the front of every built-in mode.
pub fn register_standard_buckets(registry: &mut FocusBucketRegistry) {
    registry.register(
        FocusBucket::named("commitment")
            .comparator(compare_commitments)
            .mode("money", ModeOverride::order(["commitment", "hustle", "upgrade"]))
            .mode("upgrades", ModeOverride::order(["commitment", "upgrade", "hustle"]))
            .mode(
                "balanced",
                ModeOverride::order(["commitment", "upgrade", "hustle"])
                    .with_interleave(["commitment", "upgrade", "hustle"]),
            ),
    );
    registry.register(FocusBucket::named("hustle").comparator(compare_hustles));
    registry.register(FocusBucket::named("upgrade").comparator(compare_upgrades));
}

pub fn standard_registry() -> FocusBucketRegistry {
    let mut registry = FocusBucketRegistry::new();
    register_standard_buckets(&mut registry);
    registry
}
