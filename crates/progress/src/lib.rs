//! Progression tracking service.
//!
//! Ties the pure progression model to a storage backend: load, apply,
//! grant due achievements, persist.

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod service;

pub use error::{ProgressError, Result};
pub use event::{ProgressEvent, ProgressUpdate};
pub use service::{AchievementStatus, ProgressSummary, ProgressionService};
