//! Core domain logic for the task time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Task records: running timers, completed log entries, aggregated views
//! - Log identifiers: generation and validation of 8-character IDs
//! - Windows: resolving dashboard periods and share-of-period denominators

pub mod task;
pub mod types;
pub mod window;

pub use task::{
    ActiveTask, DurationSummary, TaskDurationSummary, TaskLogEntry, TaskLogGroup,
    elapsed_seconds, non_negative, normalize_task_name,
};
pub use types::{LOG_ID_ALPHABET, LOG_ID_LENGTH, LogId, ValidationError};
pub use window::{LogRange, Period, ShareBase, Window};
