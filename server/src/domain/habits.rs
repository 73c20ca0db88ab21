//! Habit service
//!
//! Orchestrates the habit store, the ownership policy and the completion
//! tracker. Handlers call this; it never touches HTTP types.

use std::fmt;
use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::NaiveDate;
use thiserror::Error;

use super::completion::{self, CompletionError, Progress};
use super::ownership::{EmailMatchPolicy, OwnershipPolicy, Requester};
use crate::core::constants::{HABIT_LIST_LIMIT, RECENT_HABITS_LIMIT};
use crate::data::types::{CompletionWrite, Habit, HabitChanges, HabitFilter, NewHabit};
use crate::data::{DataError, HabitStore};

/// Owner-only operations, used in forbidden messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitAction {
    Update,
    Delete,
    Complete,
}

impl fmt::Display for HabitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Error, Debug)]
pub enum HabitError {
    #[error("Habit not found: {0}")]
    NotFound(ObjectId),

    #[error("You can only {action} your own habit")]
    Forbidden { action: HabitAction },

    #[error("No fields to update")]
    NothingToUpdate,

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Habit operations over the configured store
#[derive(Clone)]
pub struct HabitService {
    store: HabitStore,
    policy: Arc<dyn OwnershipPolicy>,
}

impl HabitService {
    pub fn new(store: HabitStore, policy: Arc<dyn OwnershipPolicy>) -> Self {
        tracing::debug!(policy = policy.name(), "Ownership policy configured");
        Self { store, policy }
    }

    /// Service using exact email matching for ownership
    pub fn with_email_policy(store: HabitStore) -> Self {
        Self::new(store, Arc::new(EmailMatchPolicy))
    }

    pub async fn list(&self, filter: &HabitFilter) -> Result<Vec<Habit>, HabitError> {
        Ok(self
            .store
            .repository()
            .list_habits(filter, HABIT_LIST_LIMIT)
            .await?)
    }

    /// Newest habits across all users
    pub async fn recent(&self) -> Result<Vec<Habit>, HabitError> {
        Ok(self
            .store
            .repository()
            .list_habits(&HabitFilter::default(), RECENT_HABITS_LIMIT)
            .await?)
    }

    pub async fn get(&self, id: &ObjectId) -> Result<Habit, HabitError> {
        self.store
            .repository()
            .get_habit(id)
            .await?
            .ok_or(HabitError::NotFound(*id))
    }

    pub async fn create(&self, new: NewHabit) -> Result<Habit, HabitError> {
        let habit = self.store.repository().create_habit(new).await?;
        tracing::info!(habit_id = %habit.id, owner = %habit.user_email, "Habit created");
        Ok(habit)
    }

    /// Load a habit and check the requester may modify it
    async fn owned(
        &self,
        id: &ObjectId,
        requester: &Requester,
        action: HabitAction,
    ) -> Result<Habit, HabitError> {
        let habit = self.get(id).await?;
        if !self.policy.may_modify(requester, &habit) {
            tracing::debug!(habit_id = %id, %action, "Ownership check failed");
            return Err(HabitError::Forbidden { action });
        }
        Ok(habit)
    }

    /// Owner-only partial update; returns the updated habit
    pub async fn update(
        &self,
        id: &ObjectId,
        requester: &Requester,
        changes: HabitChanges,
    ) -> Result<Habit, HabitError> {
        self.owned(id, requester, HabitAction::Update).await?;

        let changes = changes.retain_non_empty();
        if changes.is_empty() {
            return Err(HabitError::NothingToUpdate);
        }

        if !self.store.repository().update_habit(id, &changes).await? {
            return Err(HabitError::NotFound(*id));
        }
        tracing::info!(habit_id = %id, "Habit updated");
        self.get(id).await
    }

    /// Owner-only permanent delete
    pub async fn delete(&self, id: &ObjectId, requester: &Requester) -> Result<(), HabitError> {
        self.owned(id, requester, HabitAction::Delete).await?;
        if !self.store.repository().delete_habit(id).await? {
            return Err(HabitError::NotFound(*id));
        }
        tracing::info!(habit_id = %id, "Habit deleted");
        Ok(())
    }

    /// Owner-only completion for `today`; returns the updated history.
    ///
    /// The tracker validates the history and rejects a same-day repeat up
    /// front. The store write is an atomic append-if-absent, so a concurrent
    /// request that slipped past the pre-check is still rejected.
    pub async fn complete(
        &self,
        id: &ObjectId,
        requester: &Requester,
        today: NaiveDate,
    ) -> Result<Vec<String>, HabitError> {
        let habit = self.owned(id, requester, HabitAction::Complete).await?;
        let today = completion::format_date(today);

        completion::record_completion(&habit.completion_history, &today)?;

        match self.store.repository().add_completion(id, &today).await? {
            CompletionWrite::Recorded(history) => {
                tracing::info!(habit_id = %id, date = %today, "Completion recorded");
                Ok(history)
            }
            CompletionWrite::AlreadyRecorded => {
                tracing::debug!(habit_id = %id, date = %today, "Lost completion race");
                Err(CompletionError::DuplicateCompletion { date: today }.into())
            }
            CompletionWrite::HabitMissing => Err(HabitError::NotFound(*id)),
        }
    }

    /// Progress and streak for the window ending `today`
    pub async fn progress(
        &self,
        id: &ObjectId,
        today: NaiveDate,
    ) -> Result<(Habit, Progress), HabitError> {
        let habit = self.get(id).await?;
        let progress = completion::derive_progress(
            &habit.completion_history,
            &completion::format_date(today),
        )?;
        Ok((habit, progress))
    }
}
