//! In-memory catalog for offline runs and testing.
//!
//! Records are registered per search term and served in pages exactly as the
//! remote catalog would: `totalNumber` is the term's record count and each
//! page is the slice starting at the request offset.

use crate::pagination::SearchPage;
use crate::ports::CatalogSource;
use crate::query::SearchRequest;
use async_trait::async_trait;
use infrarisk_core::{InfraRiskError, Result};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory implementation of CatalogSource
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    terms: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `records` for searches on `term`
    pub fn with_term(mut self, term: impl Into<String>, records: Vec<Value>) -> Self {
        self.terms.entry(term.into()).or_default().extend(records);
        self
    }

    /// Make every search on `term` fail
    pub fn failing_term(mut self, term: impl Into<String>) -> Self {
        self.failing.insert(term.into());
        self
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<SearchRequest> {
        match self.requests.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record_request(&self, request: &SearchRequest) {
        match self.requests.lock() {
            Ok(mut log) => log.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        self.record_request(request);

        if self.failing.contains(&request.term) {
            return Err(InfraRiskError::Catalog {
                reason: format!("HTTP 503 Service Unavailable: search for '{}'", request.term),
            });
        }

        let records = self.terms.get(&request.term).map(Vec::as_slice).unwrap_or_default();
        let start = request.offset.min(records.len());
        let end = request.offset.saturating_add(request.limit).min(records.len());

        Ok(SearchPage::new(records.len(), records[start..end].to_vec()))
    }

    fn source_name(&self) -> &str {
        "memory"
    }
}
