//! # Integration Flows
//!
//! Every test builds its own container, so tests never share state.

pub mod fixtures;

mod bus_queries;
mod concurrency;
mod flows;
#[cfg(feature = "rocksdb")]
mod persistence;
