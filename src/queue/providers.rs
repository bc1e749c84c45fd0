//! Pluggable entry providers.
//!
//! Quick hustles, upgrade suggestions and fallback tasks each register a
//! provider. Providers are called in priority order on every queue build; a
//! provider that errors or panics contributes nothing.

use std::panic::{self, AssertUnwindSafe};

use anyhow::Result;

use super::metrics::QueueMetrics;
use crate::models::state::non_blank;
use crate::models::{DailySummary, GameState, QueueEntry};
use crate::utils::format_duration;
use crate::{log_debug, log_warn};

const ENABLE_LOGS: bool = true;

const DEFAULT_ENTRY_TITLE: &str = "Action";

/// What a provider sees on each build.
#[derive(Debug, Clone, Copy)]
pub struct ProviderContext<'a> {
    pub state: &'a GameState,
    pub summary: &'a DailySummary,
}

/// Everything one provider contributes.
#[derive(Debug, Clone, Default)]
pub struct ProviderResult {
    pub id: Option<String>,
    pub focus_category: Option<String>,
    pub entries: Vec<QueueEntry>,
    pub metrics: QueueMetrics,
}

pub trait ActionProvider: Send + Sync {
    fn provide(&self, context: &ProviderContext<'_>) -> Result<Option<ProviderResult>>;
}

impl<F> ActionProvider for F
where
    F: Fn(&ProviderContext<'_>) -> Result<Option<ProviderResult>> + Send + Sync,
{
    fn provide(&self, context: &ProviderContext<'_>) -> Result<Option<ProviderResult>> {
        self(context)
    }
}

/// Token returned by [`ProviderRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderHandle(u64);

struct ProviderRecord {
    handle: ProviderHandle,
    priority: i32,
    provider: Box<dyn ActionProvider>,
}

#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<ProviderRecord>,
    next_handle: u64,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P>(&mut self, provider: P, priority: i32) -> ProviderHandle
    where
        P: ActionProvider + 'static,
    {
        let handle = ProviderHandle(self.next_handle);
        self.next_handle += 1;
        self.providers.push(ProviderRecord {
            handle,
            priority,
            provider: Box::new(provider),
        });
        handle
    }

    /// Returns `false` when the handle was already released.
    pub fn unregister(&mut self, handle: ProviderHandle) -> bool {
        let before = self.providers.len();
        self.providers.retain(|record| record.handle != handle);
        self.providers.len() != before
    }

    pub fn clear(&mut self) {
        self.providers.clear();
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Call every provider, highest priority first, registration order
    /// breaking ties. Entries come back normalized with excluded ones removed.
    pub fn collect(&self, context: &ProviderContext<'_>) -> Vec<ProviderResult> {
        let mut ordered: Vec<&ProviderRecord> = self.providers.iter().collect();
        // Handles are issued in registration order.
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.handle.0.cmp(&b.handle.0)));

        ordered
            .into_iter()
            .filter_map(|record| {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| record.provider.provide(context)));
                let result = match outcome {
                    Ok(Ok(result)) => result?,
                    Ok(Err(err)) => {
                        log_warn!("queue provider {:?} failed: {err:#}", record.handle);
                        return None;
                    }
                    Err(_) => {
                        log_warn!("queue provider {:?} panicked", record.handle);
                        return None;
                    }
                };

                let focus_category = result.focus_category.clone();
                let scope = non_blank(result.id.as_deref())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("provider-{}", record.handle.0));
                let entries = normalize_provider_entries(
                    result.entries,
                    focus_category.as_deref(),
                    Some(scope.as_str()),
                )
                    .into_iter()
                    .filter(|entry| {
                        if entry.exclude_from_queue {
                            log_debug!("provider entry {} excluded from queue", entry.id);
                        }
                        !entry.exclude_from_queue
                    })
                    .collect();

                Some(ProviderResult {
                    id: result.id,
                    focus_category,
                    entries,
                    metrics: result.metrics,
                })
            })
            .collect()
    }
}

fn non_negative_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Fill defaults and clamp numbers on entries handed over by a provider.
///
/// Entries without an id get `todo-{index}`, prefixed with `scope` when one
/// is given so that two providers never mint the same fallback id.
pub fn normalize_provider_entries(
    entries: Vec<QueueEntry>,
    focus_category: Option<&str>,
    scope: Option<&str>,
) -> Vec<QueueEntry> {
    let scope = non_blank(scope);
    entries
        .into_iter()
        .enumerate()
        .map(|(index, mut entry)| {
            if entry.id.trim().is_empty() {
                entry.id = match scope {
                    Some(scope) => format!("{scope}:todo-{index}"),
                    None => format!("todo-{index}"),
                };
            }
            if entry.title.trim().is_empty() {
                entry.title = DEFAULT_ENTRY_TITLE.to_string();
            }

            entry.duration_hours = non_negative_or_zero(entry.duration_hours);
            if entry.duration_text.trim().is_empty() {
                entry.duration_text = format_duration(entry.duration_hours);
            }
            if entry.meta.trim().is_empty() {
                entry.meta = [entry.payout_text.as_str(), entry.duration_text.as_str()]
                    .into_iter()
                    .filter(|part| !part.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join(" • ");
            }

            if entry.remaining_runs.map(|runs| runs > 1).unwrap_or(false) {
                entry.repeatable = true;
            }

            entry.money_cost = non_negative_or_zero(entry.money_cost);
            entry.payout = non_negative_or_zero(entry.payout);
            entry.money_per_hour = if entry.duration_hours > 0.0 {
                entry.payout / entry.duration_hours
            } else {
                entry.payout
            };
            entry.upgrade_remaining = entry
                .upgrade_remaining
                .filter(|remaining| remaining.is_finite())
                .map(|remaining| remaining.max(0.0));

            if non_blank(entry.focus_category.as_deref()).is_none() {
                entry.focus_category = non_blank(focus_category).map(str::to_string);
            }
            if entry.order_index.is_none() {
                entry.order_index = Some(index as i64);
            }
            entry
        })
        .collect()
}
