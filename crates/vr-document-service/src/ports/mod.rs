//! # Ports
//!
//! - `inbound` - the API the service exposes (driving side)
//! - `outbound` - what the service needs from storage and the clock (driven side)

pub mod inbound;
pub mod outbound;

pub use inbound::{DocumentApi, NotificationApi};
pub use outbound::{DocumentRepository, InsertOutcome, NotificationRepository, TimeSource};
