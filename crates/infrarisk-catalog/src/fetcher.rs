//! Multi-term paginated fetching
//!
//! For each search term of a preset the fetcher requests pages until the
//! accumulator says stop, sleeping between pages. A failing term is logged
//! and recorded; records gathered before the failure are kept.

use crate::pagination::{PageAccumulator, PageOutcome, StopReason};
use crate::ports::CatalogSource;
use crate::query::SearchPreset;
use infrarisk_core::config::CatalogConfig;
use infrarisk_core::models::Entity;
use infrarisk_core::normalize::{normalize_records, DatasetKind};
use serde_json::Value;
use std::time::Duration;

/// A search term that failed, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFailure {
    pub term: String,
    pub reason: String,
}

/// Raw records gathered for one preset
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Unique records in first-seen order
    pub records: Vec<Value>,
    /// Records discarded for lacking an id
    pub missing_id: usize,
    pub failures: Vec<TermFailure>,
}

/// Normalized entities for one preset
#[derive(Debug, Clone)]
pub struct FetchedEntities {
    pub kind: DatasetKind,
    pub entities: Vec<Entity>,
    /// Raw records without an id or rejected by the normalizer
    pub dropped: usize,
    pub failures: Vec<TermFailure>,
}

/// Paginating fetcher over a catalog source
pub struct Fetcher<S> {
    source: S,
    page_size: usize,
    max_records: usize,
    page_delay: Duration,
}

impl<S: CatalogSource> Fetcher<S> {
    pub fn new(source: S, config: &CatalogConfig) -> Self {
        Self {
            source,
            page_size: config.page_size,
            max_records: config.max_records,
            page_delay: Duration::from_millis(config.page_delay_ms),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch every term of the preset, de-duplicating records by id
    pub async fn fetch(&self, preset: &SearchPreset) -> FetchOutcome {
        let mut acc = PageAccumulator::new(self.page_size, self.max_records);
        let mut failures = Vec::new();

        tracing::info!(
            "Fetching {} from {} ({} search terms)",
            preset.kind,
            self.source.source_name(),
            preset.terms.len()
        );

        for term in &preset.terms {
            acc.start_term();
            loop {
                let request = preset.request(term, acc.offset(), acc.page_size());
                let page = match self.source.search(&request).await {
                    Ok(page) => page,
                    Err(e) => {
                        tracing::warn!("Search for '{}' failed: {}", term, e);
                        failures.push(TermFailure { term: term.clone(), reason: e.to_string() });
                        break;
                    }
                };

                let total = page.total_number;
                let outcome = acc.absorb(page);
                tracing::info!("'{}': {} records collected ({} reported)", term, acc.len(), total);

                match outcome {
                    PageOutcome::Continue => {
                        if !self.page_delay.is_zero() {
                            tokio::time::sleep(self.page_delay).await;
                        }
                    }
                    PageOutcome::Stop(StopReason::EmptyBatch) => {
                        tracing::debug!("'{}': no further results", term);
                        break;
                    }
                    PageOutcome::Stop(reason) => {
                        tracing::debug!("'{}': stopped paging ({:?})", term, reason);
                        break;
                    }
                }
            }

            if acc.is_full() {
                tracing::info!("Reached the cap of {} records", self.max_records);
                break;
            }
        }

        let missing_id = acc.missing_id();
        FetchOutcome { records: acc.into_records(), missing_id, failures }
    }

    /// Fetch and normalize the preset into entities
    pub async fn fetch_entities(&self, preset: &SearchPreset) -> FetchedEntities {
        let outcome = self.fetch(preset).await;
        let batch = normalize_records(&outcome.records, preset.kind);

        tracing::info!(
            "Normalized {} {} entities ({} dropped)",
            batch.entities.len(),
            preset.kind,
            batch.dropped + outcome.missing_id
        );

        FetchedEntities {
            kind: preset.kind,
            entities: batch.entities,
            dropped: batch.dropped + outcome.missing_id,
            failures: outcome.failures,
        }
    }
}
