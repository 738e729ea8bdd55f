//! Template matching against live screen regions.
//!
//! [`Finder`] is the high-level entry point; [`locate`] matches an already
//! captured screenshot, and the `wait_until_*` loops are exposed for callers
//! that bring their own attempt.

mod finder;
mod matcher;
mod mode;
mod poll;

pub use finder::Finder;
pub use matcher::{is_pattern_size_correct, locate};
pub use mode::MatchMode;
pub use poll::{wait_until_found, wait_until_vanished, VanishOutcome};
