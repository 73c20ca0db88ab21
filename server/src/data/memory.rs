//! In-memory habit store using dashmap
//!
//! Used for local runs without a database and as the backend for tests.
//! Per-key write locks from `DashMap::get_mut` make the completion
//! check-and-append atomic.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bson::oid::ObjectId;
use dashmap::DashMap;

use crate::data::error::DataError;
use crate::data::traits::HabitRepository;
use crate::data::types::{CompletionWrite, Habit, HabitChanges, HabitFilter, NewHabit};

const BACKEND: &str = "memory";

/// In-memory habit repository
#[derive(Default)]
pub struct InMemoryHabitStore {
    habits: DashMap<ObjectId, Habit>,
    closed: AtomicBool,
}

impl InMemoryHabitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed habit (used to seed tests with history)
    pub fn insert(&self, habit: Habit) {
        self.habits.insert(habit.id, habit);
    }

    fn ensure_open(&self) -> Result<(), DataError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DataError::backend_unavailable(BACKEND, "store closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl HabitRepository for InMemoryHabitStore {
    async fn list_habits(
        &self,
        filter: &HabitFilter,
        limit: usize,
    ) -> Result<Vec<Habit>, DataError> {
        self.ensure_open()?;
        let mut habits: Vec<Habit> = self
            .habits
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        habits.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        habits.truncate(limit);
        Ok(habits)
    }

    async fn get_habit(&self, id: &ObjectId) -> Result<Option<Habit>, DataError> {
        self.ensure_open()?;
        Ok(self.habits.get(id).map(|entry| entry.value().clone()))
    }

    async fn create_habit(&self, new: NewHabit) -> Result<Habit, DataError> {
        self.ensure_open()?;
        let habit = Habit::from_new(new);
        self.habits.insert(habit.id, habit.clone());
        Ok(habit)
    }

    async fn update_habit(
        &self,
        id: &ObjectId,
        changes: &HabitChanges,
    ) -> Result<bool, DataError> {
        self.ensure_open()?;
        match self.habits.get_mut(id) {
            Some(mut entry) => {
                changes.apply(entry.value_mut());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_habit(&self, id: &ObjectId) -> Result<bool, DataError> {
        self.ensure_open()?;
        Ok(self.habits.remove(id).is_some())
    }

    async fn add_completion(
        &self,
        id: &ObjectId,
        date: &str,
    ) -> Result<CompletionWrite, DataError> {
        self.ensure_open()?;
        let Some(mut entry) = self.habits.get_mut(id) else {
            return Ok(CompletionWrite::HabitMissing);
        };
        let history = &mut entry.value_mut().completion_history;
        if history.iter().any(|d| d == date) {
            return Ok(CompletionWrite::AlreadyRecorded);
        }
        history.push(date.to_string());
        Ok(CompletionWrite::Recorded(history.clone()))
    }

    async fn health_check(&self) -> Result<(), DataError> {
        self.ensure_open()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        tracing::debug!(habits = self.habits.len(), "In-memory store closed");
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_habit(email: &str, category: Option<&str>) -> NewHabit {
        NewHabit {
            user_email: email.to_string(),
            title: "Stretch".to_string(),
            category: category.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryHabitStore::new();
        let created = store
            .create_habit(new_habit("a@example.com", None))
            .await
            .unwrap();
        let fetched = store.get_habit(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(store.get_habit(&ObjectId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_limit() {
        let store = InMemoryHabitStore::new();
        store
            .create_habit(new_habit("a@example.com", Some("Health")))
            .await
            .unwrap();
        store
            .create_habit(new_habit("a@example.com", Some("Study")))
            .await
            .unwrap();
        store
            .create_habit(new_habit("b@example.com", Some("Health")))
            .await
            .unwrap();

        let all = store
            .list_habits(&HabitFilter::default(), 10)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let filter = HabitFilter {
            user_email: Some("a@example.com".to_string()),
            category: Some("Health".to_string()),
        };
        let matched = store.list_habits(&filter, 10).await.unwrap();
        assert_eq!(matched.len(), 1);

        let limited = store
            .list_habits(&HabitFilter::default(), 2)
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryHabitStore::new();
        let mut older = Habit::from_new(new_habit("a@example.com", None));
        older.created_at = Some(bson::DateTime::from_millis(1_000));
        let mut newer = Habit::from_new(new_habit("a@example.com", None));
        newer.created_at = Some(bson::DateTime::from_millis(2_000));
        store.insert(older.clone());
        store.insert(newer.clone());

        let listed = store
            .list_habits(&HabitFilter::default(), 10)
            .await
            .unwrap();
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryHabitStore::new();
        let habit = store
            .create_habit(new_habit("a@example.com", None))
            .await
            .unwrap();

        let changes = HabitChanges {
            title: Some("Yoga".to_string()),
            ..Default::default()
        };
        assert!(store.update_habit(&habit.id, &changes).await.unwrap());
        assert_eq!(
            store.get_habit(&habit.id).await.unwrap().unwrap().title,
            "Yoga"
        );
        assert!(!store.update_habit(&ObjectId::new(), &changes).await.unwrap());

        assert!(store.delete_habit(&habit.id).await.unwrap());
        assert!(!store.delete_habit(&habit.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_completion_once() {
        let store = InMemoryHabitStore::new();
        let habit = store
            .create_habit(new_habit("a@example.com", None))
            .await
            .unwrap();

        let first = store.add_completion(&habit.id, "2024-03-10").await.unwrap();
        assert_eq!(
            first,
            CompletionWrite::Recorded(vec!["2024-03-10".to_string()])
        );
        let second = store.add_completion(&habit.id, "2024-03-10").await.unwrap();
        assert_eq!(second, CompletionWrite::AlreadyRecorded);
        let missing = store
            .add_completion(&ObjectId::new(), "2024-03-10")
            .await
            .unwrap();
        assert_eq!(missing, CompletionWrite::HabitMissing);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_add_completion_concurrent() {
        let store = Arc::new(InMemoryHabitStore::new());
        let habit = store
            .create_habit(new_habit("a@example.com", None))
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let id = habit.id;
                tokio::spawn(async move { store.add_completion(&id, "2024-03-10").await })
            })
            .collect();

        let mut recorded = 0;
        for handle in handles {
            if let CompletionWrite::Recorded(_) = handle.await.unwrap().unwrap() {
                recorded += 1;
            }
        }
        assert_eq!(recorded, 1);
        let stored = store.get_habit(&habit.id).await.unwrap().unwrap();
        assert_eq!(stored.completion_history, vec!["2024-03-10".to_string()]);
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = InMemoryHabitStore::new();
        store.close().await;
        assert!(store.health_check().await.is_err());
        assert!(store.get_habit(&ObjectId::new()).await.is_err());
    }
}
