//! Focus bucket registry.
//!
//! Buckets partition queue entries; each bucket may carry a comparator for
//! ordering inside it, and named modes decide how buckets are stitched back
//! together. The registry is an ordinary value: whoever assembles the queue
//! owns one and passes it down.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::models::state::non_blank;
use crate::models::QueueEntry;

pub const DEFAULT_FOCUS_BUCKET: &str = "other";
pub const DEFAULT_FOCUS_MODE: &str = "balanced";

const BUCKET_ALIASES: &[(&str, &str)] = &[
    ("education", "study"),
    ("course", "study"),
    ("training", "study"),
    ("lesson", "study"),
    ("class", "study"),
    ("contract", "hustle"),
    ("project", "hustle"),
    ("gig", "hustle"),
    ("work", "hustle"),
    ("maintenance", "commitment"),
    ("upkeep", "commitment"),
    ("care", "commitment"),
    ("support", "commitment"),
];

/// Trim, lower-case and de-alias a bucket name. Blank names are absent.
pub fn normalize_bucket_name(value: Option<&str>) -> Option<String> {
    let trimmed = non_blank(value)?.to_lowercase();
    let canonical = BUCKET_ALIASES
        .iter()
        .find(|(alias, _)| *alias == trimmed)
        .map(|(_, bucket)| bucket.to_string());
    Some(canonical.unwrap_or(trimmed))
}

/// First candidate that normalizes to a bucket name.
pub fn resolve_queue_category<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates.into_iter().find_map(normalize_bucket_name)
}

/// Bucket an entry belongs to: explicit bucket, then category, then `other`.
pub fn resolve_focus_bucket(entry: &QueueEntry) -> String {
    resolve_queue_category([entry.focus_bucket.as_deref(), entry.focus_category.as_deref()])
        .unwrap_or_else(|| DEFAULT_FOCUS_BUCKET.to_string())
}

pub type BucketComparator = Arc<dyn Fn(&QueueEntry, &QueueEntry) -> Ordering + Send + Sync>;

/// Cross-bucket ordering policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeConfig {
    pub order: Vec<String>,
    pub interleave: Vec<String>,
}

/// Partial mode update. `None` lists keep whatever is already registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeOverride {
    pub order: Option<Vec<String>>,
    pub interleave: Option<Vec<String>>,
}

impl ModeOverride {
    pub fn order<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: Some(buckets.into_iter().map(Into::into).collect()),
            interleave: None,
        }
    }

    pub fn with_interleave<I, S>(mut self, buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interleave = Some(buckets.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Clone)]
enum ComparatorChange {
    Keep,
    Remove,
    Set(BucketComparator),
}

/// One registration request, built fluently and handed to
/// [`FocusBucketRegistry::register`].
#[derive(Clone)]
pub struct FocusBucket {
    name: String,
    comparator: ComparatorChange,
    modes: Vec<(String, ModeOverride)>,
}

impl FocusBucket {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comparator: ComparatorChange::Keep,
            modes: Vec::new(),
        }
    }

    pub fn comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&QueueEntry, &QueueEntry) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = ComparatorChange::Set(Arc::new(comparator));
        self
    }

    /// Drop any registered comparator; the bucket falls back to the default.
    pub fn without_comparator(mut self) -> Self {
        self.comparator = ComparatorChange::Remove;
        self
    }

    pub fn mode(mut self, name: impl Into<String>, config: ModeOverride) -> Self {
        self.modes.push((name.into(), config));
        self
    }
}

impl fmt::Debug for FocusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let comparator = match self.comparator {
            ComparatorChange::Keep => "keep",
            ComparatorChange::Remove => "remove",
            ComparatorChange::Set(_) => "set",
        };
        f.debug_struct("FocusBucket")
            .field("name", &self.name)
            .field("comparator", &comparator)
            .field("modes", &self.modes)
            .finish()
    }
}

fn sanitize_bucket_list(list: Option<Vec<String>>) -> Option<Vec<String>> {
    let list = list?;
    let mut seen = HashSet::new();
    Some(
        list.into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty() && seen.insert(item.clone()))
            .collect(),
    )
}

pub struct FocusBucketRegistry {
    comparators: HashMap<String, BucketComparator>,
    modes: HashMap<String, ModeConfig>,
}

impl Default for FocusBucketRegistry {
    fn default() -> Self {
        let mut modes = HashMap::new();
        modes.insert(
            "money".to_string(),
            ModeConfig {
                order: vec!["hustle".into(), "upgrade".into()],
                interleave: Vec::new(),
            },
        );
        modes.insert(
            "upgrades".to_string(),
            ModeConfig {
                order: vec!["upgrade".into(), "hustle".into()],
                interleave: Vec::new(),
            },
        );
        modes.insert(
            DEFAULT_FOCUS_MODE.to_string(),
            ModeConfig {
                order: vec!["upgrade".into(), "hustle".into()],
                interleave: vec!["upgrade".into(), "hustle".into()],
            },
        );

        Self {
            comparators: HashMap::new(),
            modes,
        }
    }
}

impl fmt::Debug for FocusBucketRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buckets: Vec<&String> = self.comparators.keys().collect();
        buckets.sort();
        f.debug_struct("FocusBucketRegistry")
            .field("buckets", &buckets)
            .field("modes", &self.modes)
            .finish()
    }
}

impl FocusBucketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or update a bucket. Mode lists merge with what is already
    /// registered: a list left out of the override keeps its current value.
    pub fn register(&mut self, bucket: FocusBucket) {
        let Some(name) = normalize_bucket_name(Some(bucket.name.as_str())) else {
            return;
        };

        match bucket.comparator {
            ComparatorChange::Keep => {}
            ComparatorChange::Remove => {
                self.comparators.remove(&name);
            }
            ComparatorChange::Set(comparator) => {
                self.comparators.insert(name, comparator);
            }
        }

        for (mode_name, config) in bucket.modes {
            let Some(mode_name) = non_blank(Some(mode_name.as_str())).map(str::to_string) else {
                continue;
            };
            let existing = self.modes.get(&mode_name).cloned().unwrap_or_default();
            let merged = ModeConfig {
                order: sanitize_bucket_list(config.order).unwrap_or(existing.order),
                interleave: sanitize_bucket_list(config.interleave).unwrap_or(existing.interleave),
            };
            self.modes.insert(mode_name, merged);
        }
    }

    pub fn has_bucket(&self, name: &str) -> bool {
        normalize_bucket_name(Some(name))
            .map(|name| self.comparators.contains_key(&name))
            .unwrap_or(false)
    }

    /// Comparator for a bucket, falling back to the default bucket's.
    /// `None` means keep discovery order.
    pub fn comparator(&self, bucket: &str) -> Option<&BucketComparator> {
        self.comparators
            .get(bucket.trim())
            .or_else(|| self.comparators.get(DEFAULT_FOCUS_BUCKET))
    }

    /// Registered mode by name. A blank name yields an empty config; an
    /// unknown name yields `None`.
    pub fn mode_config(&self, mode: &str) -> Option<ModeConfig> {
        let trimmed = mode.trim();
        if trimmed.is_empty() {
            return Some(ModeConfig::default());
        }
        self.modes.get(trimmed).cloned()
    }

    fn resolve_mode(&self, mode: &str) -> ModeConfig {
        self.mode_config(mode)
            .or_else(|| self.mode_config(DEFAULT_FOCUS_MODE))
            .unwrap_or_default()
    }

    /// Partition entries by bucket, in discovery order, each bucket sorted
    /// with its comparator.
    pub fn sorted_buckets(&self, entries: Vec<QueueEntry>) -> Vec<(String, Vec<QueueEntry>)> {
        let mut buckets: Vec<(String, Vec<QueueEntry>)> = Vec::new();
        for entry in entries {
            let name = resolve_focus_bucket(&entry);
            match buckets.iter_mut().find(|(bucket, _)| *bucket == name) {
                Some((_, bucket_entries)) => bucket_entries.push(entry),
                None => buckets.push((name, vec![entry])),
            }
        }

        for (name, bucket_entries) in buckets.iter_mut() {
            if let Some(comparator) = self.comparator(name) {
                bucket_entries.sort_by(|a, b| comparator(a, b));
            }
        }
        buckets
    }

    /// Order entries under `mode`.
    ///
    /// Interleaved buckets come first, one entry per bucket per round; then
    /// each `order` bucket in full; then every other bucket in discovery
    /// order. The output is always a permutation of the input.
    pub fn apply_focus_ordering(&self, entries: Vec<QueueEntry>, mode: &str) -> Vec<QueueEntry> {
        if entries.is_empty() {
            return entries;
        }

        let total = entries.len();
        let config = self.resolve_mode(mode);
        let mut buckets: Vec<(String, VecDeque<QueueEntry>)> = self
            .sorted_buckets(entries)
            .into_iter()
            .map(|(name, bucket_entries)| (name, VecDeque::from(bucket_entries)))
            .collect();

        let mut results = Vec::with_capacity(total);

        let interleaved: Vec<usize> = config
            .interleave
            .iter()
            .filter_map(|name| buckets.iter().position(|(bucket, _)| bucket == name))
            .collect();
        loop {
            let mut took_any = false;
            for index in &interleaved {
                if let Some(entry) = buckets[*index].1.pop_front() {
                    results.push(entry);
                    took_any = true;
                }
            }
            if !took_any {
                break;
            }
        }

        for name in &config.order {
            if let Some((_, bucket_entries)) = buckets.iter_mut().find(|(bucket, _)| bucket == name) {
                results.extend(bucket_entries.drain(..));
            }
        }

        for (_, bucket_entries) in buckets.iter_mut() {
            results.extend(bucket_entries.drain(..));
        }

        results
    }
}
