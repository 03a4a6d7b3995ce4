//! Analysis modules.
//!
//! `stats` holds the skip-NA column statistics, `aggregator` the month
//! grouping, correlation and chart-support aggregates built on top of them.

pub mod aggregator;
pub mod stats;

pub use aggregator::*;
