//! # Adapters
//!
//! Port implementations that live outside the domain crate.

pub mod storage;
