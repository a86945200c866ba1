//! Offset pagination and record de-duplication
//!
//! The accumulator is a pure state machine: the fetcher asks it for the next
//! offset, feeds it each page, and stops as soon as it reports a
//! [`StopReason`]. Records are keyed by their catalog id; a record seen again
//! replaces the earlier copy but keeps its original position.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// One page of search results as returned under `data.search`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub total_number: usize,
    #[serde(default)]
    pub search_results: Vec<Value>,
}

impl SearchPage {
    pub fn new(total_number: usize, search_results: Vec<Value>) -> Self {
        Self { total_number, search_results }
    }
}

/// Why paging stopped for one term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The page came back empty
    EmptyBatch,
    /// The page held fewer records than requested
    ShortBatch,
    /// The offset reached the reported total
    TotalReached,
    /// The unique record cap was hit
    MaxRecords,
}

/// What to do after absorbing a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Continue,
    Stop(StopReason),
}

/// Collects unique records across pages and terms
#[derive(Debug, Clone)]
pub struct PageAccumulator {
    page_size: usize,
    max_records: usize,
    offset: usize,
    records: Vec<Value>,
    positions: HashMap<String, usize>,
    missing_id: usize,
}

impl PageAccumulator {
    pub fn new(page_size: usize, max_records: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            max_records,
            offset: 0,
            records: Vec::new(),
            positions: HashMap::new(),
            missing_id: 0,
        }
    }

    /// Reset the offset for the next search term; collected records stay
    pub fn start_term(&mut self) {
        self.offset = 0;
    }

    /// Offset of the next page to request
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Merge one page and decide whether to request another
    pub fn absorb(&mut self, page: SearchPage) -> PageOutcome {
        let count = page.search_results.len();
        if count == 0 {
            return PageOutcome::Stop(StopReason::EmptyBatch);
        }

        for record in page.search_results {
            self.insert(record);
        }
        self.offset += count;

        if self.is_full() {
            PageOutcome::Stop(StopReason::MaxRecords)
        } else if self.offset >= page.total_number {
            PageOutcome::Stop(StopReason::TotalReached)
        } else if count < self.page_size {
            PageOutcome::Stop(StopReason::ShortBatch)
        } else {
            PageOutcome::Continue
        }
    }

    fn insert(&mut self, record: Value) {
        let Some(id) = record_id(&record) else {
            self.missing_id += 1;
            return;
        };
        match self.positions.get(&id) {
            Some(&position) => self.records[position] = record,
            None => {
                self.positions.insert(id, self.records.len());
                self.records.push(record);
            }
        }
    }

    /// True once the unique record cap is reached
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.max_records
    }

    /// Number of unique records collected
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records discarded because they carried no id
    pub fn missing_id(&self) -> usize {
        self.missing_id
    }

    /// Unique records in first-seen order
    pub fn into_records(self) -> Vec<Value> {
        self.records
    }
}

/// Catalog id of a raw record as text
fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
