//! # Event Handlers
//!
//! Background tasks driven by the event bus.
//!
//! - `api_query`: answers gateway queries addressed to the document service
//! - `calendar`: regenerates a user's calendar after each mutation
//! - `activity`: structured activity log

pub mod activity;
pub mod api_query;
pub mod calendar;

pub use activity::ActivityLogHandler;
pub use api_query::ApiQueryHandler;
pub use calendar::{CalendarRefreshHandler, CalendarSink, CalendarSinkError, LoggingCalendarSink};
