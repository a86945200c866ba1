//! InfraRisk Core - Domain models, normalization, and configuration
//!
//! This crate contains the entity and match-record models shared by every
//! InfraRisk crate, the single catalog-record normalization path, and the
//! layered configuration.

pub mod config;
pub mod error;
pub mod models;
pub mod normalize;

pub use error::{InfraRiskError, Result};
