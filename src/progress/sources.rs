//! Candidate extractors over the records a commitment is stitched from.
//!
//! Each record type is one [`Source`] variant. A field is resolved by walking
//! an ordered chain of [`SourceKind`]s and taking the first value a source
//! reports, so precedence lives in the chain constants below rather than in
//! nested conditionals.

use crate::models::state::{coerce_day, non_blank, positive, ProgressMetadata};
use crate::models::{
    AcceptedOffer, CommitmentInstance, CompletionMode, Definition, HustleOffer, InstanceProgress,
    OfferMetadata,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Instance,
    Progress,
    MetadataProgress,
    Accepted,
    Offer,
    Definition,
}

pub const HOURS_REQUIRED_CHAIN: &[SourceKind] = &[
    SourceKind::Instance,
    SourceKind::Progress,
    SourceKind::MetadataProgress,
    SourceKind::Accepted,
    SourceKind::Offer,
    SourceKind::Definition,
];

pub const HOURS_PER_DAY_CHAIN: &[SourceKind] = &[
    SourceKind::Progress,
    SourceKind::MetadataProgress,
    SourceKind::Accepted,
    SourceKind::Offer,
    SourceKind::Definition,
];

pub const DAYS_REQUIRED_CHAIN: &[SourceKind] = HOURS_PER_DAY_CHAIN;

pub const COMPLETION_CHAIN: &[SourceKind] = &[
    SourceKind::Progress,
    SourceKind::MetadataProgress,
    SourceKind::Accepted,
    SourceKind::Offer,
    SourceKind::Definition,
];

pub const DEADLINE_CHAIN: &[SourceKind] = &[
    SourceKind::Instance,
    SourceKind::Progress,
    SourceKind::Accepted,
    SourceKind::Offer,
];

/// One input record, tagged by where it came from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Instance(&'a CommitmentInstance),
    Progress(&'a InstanceProgress),
    MetadataProgress(&'a ProgressMetadata),
    Accepted(&'a AcceptedOffer),
    Offer(&'a HustleOffer),
    Definition(&'a Definition),
}

fn first_positive<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().find_map(positive)
}

fn first_mode<'s, I>(values: I) -> Option<CompletionMode>
where
    I: IntoIterator<Item = Option<&'s str>>,
{
    values
        .into_iter()
        .find_map(|value| value.and_then(CompletionMode::parse))
}

fn metadata_hours_per_day(metadata: &OfferMetadata) -> Option<f64> {
    first_positive([
        metadata.hours_per_day,
        metadata.progress.as_ref().and_then(|progress| progress.hours_per_day),
    ])
}

fn metadata_days_required(metadata: &OfferMetadata) -> Option<f64> {
    first_positive([
        metadata.days_required,
        metadata.progress.as_ref().and_then(|progress| progress.days_required),
    ])
}

fn metadata_completion(metadata: &OfferMetadata) -> Option<CompletionMode> {
    let progress = metadata.progress.as_ref();
    first_mode([
        metadata.completion_mode.as_deref(),
        progress.and_then(|progress| progress.completion_mode.as_deref()),
        progress.and_then(|progress| progress.completion.as_deref()),
    ])
}

impl<'a> Source<'a> {
    pub fn hours_required(&self) -> Option<f64> {
        match self {
            Source::Instance(instance) => positive(instance.hours_required),
            Source::Progress(progress) => positive(progress.hours_required),
            Source::MetadataProgress(progress) => positive(progress.hours_required),
            Source::Accepted(accepted) => positive(accepted.hours_required),
            Source::Offer(offer) => offer.metadata.as_ref().and_then(|metadata| {
                let requirements = metadata.requirements.as_ref();
                first_positive([
                    metadata.hours_required,
                    requirements.and_then(|requirements| requirements.hours),
                    requirements.and_then(|requirements| requirements.time_hours),
                ])
            }),
            Source::Definition(definition) => first_positive([
                definition.time,
                definition.action.as_ref().and_then(|action| action.time_cost),
            ]),
        }
    }

    pub fn hours_per_day(&self) -> Option<f64> {
        match self {
            Source::Instance(_) => None,
            Source::Progress(progress) => positive(progress.hours_per_day),
            Source::MetadataProgress(progress) => positive(progress.hours_per_day),
            Source::Accepted(accepted) => accepted.metadata.as_ref().and_then(metadata_hours_per_day),
            Source::Offer(offer) => offer.metadata.as_ref().and_then(metadata_hours_per_day),
            Source::Definition(definition) => definition
                .progress
                .as_ref()
                .and_then(|progress| positive(progress.hours_per_day)),
        }
    }

    pub fn days_required(&self) -> Option<f64> {
        match self {
            Source::Instance(_) => None,
            Source::Progress(progress) => positive(progress.days_required),
            Source::MetadataProgress(progress) => positive(progress.days_required),
            Source::Accepted(accepted) => accepted.metadata.as_ref().and_then(metadata_days_required),
            Source::Offer(offer) => offer.metadata.as_ref().and_then(metadata_days_required),
            Source::Definition(definition) => definition
                .progress
                .as_ref()
                .and_then(|progress| positive(progress.days_required)),
        }
    }

    pub fn completion_mode(&self) -> Option<CompletionMode> {
        match self {
            Source::Instance(_) => None,
            Source::Progress(progress) => first_mode([
                progress.completion.as_deref(),
                progress.completion_mode.as_deref(),
            ]),
            Source::MetadataProgress(progress) => first_mode([
                progress.completion_mode.as_deref(),
                progress.completion.as_deref(),
            ]),
            Source::Accepted(accepted) => accepted.metadata.as_ref().and_then(metadata_completion),
            Source::Offer(offer) => offer.metadata.as_ref().and_then(metadata_completion),
            Source::Definition(definition) => definition
                .progress
                .as_ref()
                .and_then(|progress| first_mode([progress.completion.as_deref()])),
        }
    }

    /// Earliest deadline this record knows about.
    pub fn deadline_day(&self) -> Option<u32> {
        match self {
            Source::Instance(instance) => coerce_day(instance.deadline_day),
            Source::Progress(progress) => coerce_day(progress.deadline_day),
            Source::Accepted(accepted) => coerce_day(accepted.deadline_day),
            Source::Offer(offer) => [
                coerce_day(offer.claim_deadline_day),
                coerce_day(offer.expires_on_day),
            ]
            .into_iter()
            .flatten()
            .min(),
            Source::MetadataProgress(_) | Source::Definition(_) => None,
        }
    }
}

/// The records one commitment is assembled from.
#[derive(Debug, Clone, Copy)]
pub struct CommitmentSources<'a> {
    pub instance: &'a CommitmentInstance,
    pub accepted: Option<&'a AcceptedOffer>,
    pub offer: Option<&'a HustleOffer>,
    pub definition: Option<&'a Definition>,
}

impl<'a> CommitmentSources<'a> {
    pub fn progress(&self) -> Option<&'a InstanceProgress> {
        self.instance.progress.as_ref()
    }

    /// Progress block from the accepted record's metadata, else the offer's.
    pub fn metadata_progress(&self) -> Option<&'a ProgressMetadata> {
        self.accepted
            .and_then(|accepted| accepted.metadata.as_ref())
            .and_then(|metadata| metadata.progress.as_ref())
            .or_else(|| {
                self.offer
                    .and_then(|offer| offer.metadata.as_ref())
                    .and_then(|metadata| metadata.progress.as_ref())
            })
    }

    /// Metadata attached to the commitment: accepted record first, then the
    /// offer's claim metadata, then the offer's listing metadata.
    pub fn metadata(&self) -> Option<&'a OfferMetadata> {
        self.accepted
            .and_then(|accepted| accepted.metadata.as_ref())
            .or_else(|| self.offer.and_then(|offer| offer.claim_metadata.as_ref()))
            .or_else(|| self.offer.and_then(|offer| offer.metadata.as_ref()))
    }

    pub fn source(&self, kind: SourceKind) -> Option<Source<'a>> {
        match kind {
            SourceKind::Instance => Some(Source::Instance(self.instance)),
            SourceKind::Progress => self.progress().map(Source::Progress),
            SourceKind::MetadataProgress => self.metadata_progress().map(Source::MetadataProgress),
            SourceKind::Accepted => self.accepted.map(Source::Accepted),
            SourceKind::Offer => self.offer.map(Source::Offer),
            SourceKind::Definition => self.definition.map(Source::Definition),
        }
    }

    /// First value reported along `chain`.
    pub fn resolve<T, F>(&self, chain: &[SourceKind], extract: F) -> Option<T>
    where
        F: Fn(&Source<'a>) -> Option<T>,
    {
        chain
            .iter()
            .filter_map(|kind| self.source(*kind))
            .find_map(|source| extract(&source))
    }

    /// Every value reported along `chain`, in chain order.
    pub fn collect<T, F>(&self, chain: &[SourceKind], extract: F) -> Vec<T>
    where
        F: Fn(&Source<'a>) -> Option<T>,
    {
        chain
            .iter()
            .filter_map(|kind| self.source(*kind))
            .filter_map(|source| extract(&source))
            .collect()
    }

    /// Study track this commitment feeds, if any.
    pub fn study_track_id(&self) -> Option<String> {
        let progress = self.progress();
        let metadata = self.metadata();
        let definition = self.definition;

        let explicit = [
            progress.and_then(|progress| progress.study_track_id.as_deref()),
            progress.and_then(|progress| progress.track_id.as_deref()),
            metadata.and_then(|metadata| metadata.study_track_id.as_deref()),
            metadata.and_then(|metadata| metadata.track_id.as_deref()),
            definition.and_then(|definition| definition.study_track_id.as_deref()),
            definition
                .and_then(|definition| definition.progress.as_ref())
                .and_then(|progress| progress.study_track_id.as_deref()),
        ];
        if let Some(track) = explicit.into_iter().find_map(non_blank) {
            return Some(track.to_string());
        }

        [
            definition.map(|definition| definition.id.as_str()),
            self.instance.definition_id.as_deref(),
            metadata.and_then(|metadata| metadata.definition_id.as_deref()),
        ]
        .into_iter()
        .flatten()
        .find_map(|id| id.strip_prefix("study-"))
        .filter(|track| !track.is_empty())
        .map(str::to_string)
    }
}
