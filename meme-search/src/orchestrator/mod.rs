//! Search orchestrator: concurrent provider fan-out, join, dedup.
//!
//! This module fans a keyword out to every targeted provider concurrently,
//! records each provider's success or failure, and deduplicates the merged
//! items by content-derived key.

pub mod dedup;
pub mod search;
pub mod url_normalize;
