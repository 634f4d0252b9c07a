//! Persisted analysis history.

mod history;

pub use history::{Distribution, HistoryLog};
