//! # Shared Bus - In-Process Event Bus
//!
//! Carries domain events out of the document service and API queries into it.
//!
//! ## Delivery Rules
//!
//! - Publishing never blocks and never fails the publisher: with no live
//!   subscriber the event is dropped (and logged).
//! - There is no delivery guarantee. Subscribers that lag behind the channel
//!   capacity skip the oldest events.
//! - Subscribers filter by [`EventTopic`] and/or source component.
//!
//! ```text
//! ┌────────────────────┐                    ┌────────────────────┐
//! │ Document Service   │                    │ Calendar / Logging │
//! │                    │    publish()       │                    │
//! │                    │ ──────┐            │                    │
//! └────────────────────┘       │            └────────────────────┘
//!                              ▼                    ↑
//!                        ┌──────────────┐          │
//!                        │  Event Bus   │          │
//!                        │              │ ─────────┘
//!                        └──────────────┘  subscribe()
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{ApiQueryError, DomainEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are skipped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Source name used by the document service when publishing.
pub const DOCUMENT_SERVICE_SOURCE: &str = "vr-document-service";

/// Source name used for queries entering through the gateway.
pub const API_GATEWAY_SOURCE: &str = "api-gateway";
