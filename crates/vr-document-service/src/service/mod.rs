//! # Application Services
//!
//! `DocumentService` and `NotificationService` implement the inbound ports on
//! top of the outbound repositories. `aggregates` composes both into the
//! per-user statistics and calendar views.

mod aggregates;
mod documents;
mod helpers;
mod notifications;


pub use aggregates::{user_calendar, user_statistics};
pub use documents::DocumentService;
pub use notifications::NotificationService;
