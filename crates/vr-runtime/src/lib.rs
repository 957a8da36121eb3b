//! # Validity Runtime Library
//!
//! Wires the document service to the event bus. The main entry point is the
//! `main.rs` binary; this library exposes the pieces for tests.
//!
//! ## Background Tasks
//!
//! | Task | Subscribes to | Effect |
//! |------|---------------|--------|
//! | `ApiQueryHandler` | gateway queries | answers with `ApiQueryResponse` |
//! | `CalendarRefreshHandler` | document + notification events | passes the calendar to a sink |
//! | `ActivityLogHandler` | document + notification + DLQ events | structured activity log |
//!
//! All tasks stop on the shared shutdown signal.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod logging;
pub mod runtime;

pub use container::{
    ConfigError, ContainerError, RuntimeConfig, ServiceContainer, StorageBackend,
};
pub use runtime::ValidityRuntime;
