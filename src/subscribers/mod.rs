//! # Event subscribers for orchestration runs.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used by the orchestrator to report lifecycle transitions to an
//! injected observer instead of logging inline.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Orchestrator ── publish(Event) ──► Bus ──► subscriber listener
//!                                                    │
//!                                             SubscriberSet::emit()
//!                                              ┌──────┼──────┐
//!                                              ▼      ▼      ▼
//!                                          LogWriter Metrics Custom ...
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
