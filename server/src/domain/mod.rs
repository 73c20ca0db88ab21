//! Domain logic for habit tracking
//!
//! - `completion` - Completion recording and 30-day progress/streak derivation
//! - `ownership` - Requester identity and ownership policy
//! - `habits` - Habit service orchestrating store, policy and tracker

pub mod completion;
pub mod habits;
pub mod ownership;

pub use completion::{CompletionError, Progress};
pub use habits::{HabitAction, HabitError, HabitService};
pub use ownership::{EmailMatchPolicy, OwnershipPolicy, Requester};
