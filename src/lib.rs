//! Portfolio checker - tags aggregator accounts as spending or non-spending
//!
//! This library fetches accounts from an aggregator, classifies them against
//! a configurable rule table, and exports the tagged list to an object store
//! and a vault endpoint.

pub mod accounts;
pub mod aggregator;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod tagging;
pub mod utils;
