//! # Shared Types Crate
//!
//! Identifiers and timestamps shared by every crate in the workspace.
//!
//! ## Design Principles
//!
//! - **Typed identity**: users, documents and notifications each get their own
//!   identifier type, so a `DocumentId` can never be passed where a `UserId`
//!   is expected.
//! - **Parse at the edge**: identifiers arrive from callers as strings and are
//!   parsed exactly once, before any storage is touched.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
