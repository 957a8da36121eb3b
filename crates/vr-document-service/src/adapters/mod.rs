//! # Adapters Module
//!
//! Implementations of the outbound ports.
//!
//! - `memory`: in-process store backing both repositories under one lock
//! - `infra`: clocks

pub mod infra;
pub mod memory;

pub use infra::{ManualTimeSource, SystemTimeSource};
pub use memory::InMemoryStore;
