//! InfraRisk Catalog - Open-data catalog search and record fetching
//!
//! This crate defines the catalog search port, the GraphQL HTTP adapter and
//! an in-memory adapter, plus the paginating fetcher that turns search
//! results into normalized entities.

pub mod client;
pub mod fetcher;
pub mod memory;
pub mod pagination;
pub mod ports;
pub mod query;
pub mod sample;

pub use client::HttpCatalog;
pub use fetcher::{FetchOutcome, FetchedEntities, Fetcher, TermFailure};
pub use memory::MemoryCatalog;
pub use pagination::{PageAccumulator, PageOutcome, SearchPage, StopReason};
pub use ports::CatalogSource;
pub use query::{AttributeFilter, SearchPreset, SearchRequest};
pub use sample::{sample_catalog, sample_records, SAMPLE_REGION};
