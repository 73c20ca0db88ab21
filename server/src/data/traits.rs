//! Repository trait for habit store backends
//!
//! Each backend (MongoDB, in-memory) implements `HabitRepository` with its
//! own storage logic. Handlers only ever see the trait.

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::data::error::DataError;
use crate::data::types::{CompletionWrite, Habit, HabitChanges, HabitFilter, NewHabit};

/// Repository trait for habit documents
///
/// # Consistency Notes
///
/// `add_completion` must be atomic with respect to concurrent calls for the
/// same habit and date: exactly one caller observes `Recorded`, every other
/// caller observes `AlreadyRecorded`. The remaining operations are plain
/// single-document reads and writes.
#[async_trait]
pub trait HabitRepository: Send + Sync {
    /// List habits matching the filter, newest first, at most `limit`
    async fn list_habits(&self, filter: &HabitFilter, limit: usize)
    -> Result<Vec<Habit>, DataError>;

    /// Get a single habit by id
    async fn get_habit(&self, id: &ObjectId) -> Result<Option<Habit>, DataError>;

    /// Insert a new habit, returning the stored document
    async fn create_habit(&self, new: NewHabit) -> Result<Habit, DataError>;

    /// Apply a partial update. Returns false if the habit does not exist.
    async fn update_habit(&self, id: &ObjectId, changes: &HabitChanges)
    -> Result<bool, DataError>;

    /// Delete a habit. Returns false if the habit did not exist.
    async fn delete_habit(&self, id: &ObjectId) -> Result<bool, DataError>;

    /// Append `date` to the completion history if it is not already present
    async fn add_completion(&self, id: &ObjectId, date: &str)
    -> Result<CompletionWrite, DataError>;

    /// Health check (validates connection)
    async fn health_check(&self) -> Result<(), DataError>;

    /// Release backend resources
    async fn close(&self);

    /// Backend name for debugging/logging
    fn backend_name(&self) -> &'static str;
}
