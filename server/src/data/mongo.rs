//! MongoDB habit store
//!
//! One pooled `mongodb::Client` per process. The driver manages the
//! connection pool; this type only owns the typed collection handle.

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};

use crate::core::config::MongoConfig;
use crate::core::constants::{MONGO_CONNECT_TIMEOUT_MS, MONGO_RETRY_BASE_DELAY_MS};
use crate::data::error::DataError;
use crate::data::traits::HabitRepository;
use crate::data::types::{
    CompletionWrite, Habit, HabitChanges, HabitFilter, NewHabit, completion_guard,
};
use crate::utils::retry::retry_with_backoff_async;

const BACKEND: &str = "mongo";

/// Append server selection and connect timeouts so an unreachable server
/// fails fast instead of hanging startup.
fn with_timeouts(uri: &str) -> String {
    let params = format!(
        "serverSelectionTimeoutMS={ms}&connectTimeoutMS={ms}",
        ms = MONGO_CONNECT_TIMEOUT_MS
    );
    if uri.contains("serverSelectionTimeoutMS") {
        uri.to_string()
    } else if uri.contains('?') {
        format!("{}&{}", uri, params)
    } else if uri.ends_with('/') {
        format!("{}?{}", uri, params)
    } else {
        format!("{}/?{}", uri, params)
    }
}

/// Index definitions for the habits collection
fn habit_indexes() -> Vec<IndexModel> {
    vec![
        IndexModel::builder()
            .keys(doc! { "userEmail": 1 })
            .options(IndexOptions::builder().name("user_email".to_string()).build())
            .build(),
        IndexModel::builder()
            .keys(doc! { "category": 1 })
            .options(IndexOptions::builder().name("category".to_string()).build())
            .build(),
        IndexModel::builder()
            .keys(doc! { "createdAt": -1 })
            .options(IndexOptions::builder().name("created_at".to_string()).build())
            .build(),
    ]
}

/// Newest first; `_id` breaks ties and orders documents without `createdAt`
fn newest_first() -> Document {
    doc! { "createdAt": -1, "_id": -1 }
}

/// MongoDB-backed habit repository
#[derive(Clone)]
pub struct MongoHabitStore {
    client: Client,
    db_name: String,
    collection: Collection<Habit>,
}

impl MongoHabitStore {
    /// Connect, verify with a ping (retried with backoff), and apply indexes
    pub async fn connect(config: &MongoConfig) -> Result<Self, DataError> {
        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Connecting to MongoDB"
        );

        let client = Client::with_uri_str(with_timeouts(&config.uri)).await?;
        let database = client.database(&config.database);

        retry_with_backoff_async(
            config.connect_attempts,
            MONGO_RETRY_BASE_DELAY_MS,
            || {
                let database = database.clone();
                async move { database.run_command(doc! { "ping": 1 }).await.map(|_| ()) }
            },
        )
        .await
        .map_err(|(e, attempts)| {
            DataError::backend_unavailable(
                BACKEND,
                format!("ping failed after {} attempts: {}", attempts, e),
            )
        })?;

        let collection = database.collection::<Habit>(&config.collection);
        collection.create_indexes(habit_indexes()).await?;

        tracing::info!(database = %config.database, "Connected to MongoDB");

        Ok(Self {
            client,
            db_name: config.database.clone(),
            collection,
        })
    }
}

#[async_trait]
impl HabitRepository for MongoHabitStore {
    async fn list_habits(
        &self,
        filter: &HabitFilter,
        limit: usize,
    ) -> Result<Vec<Habit>, DataError> {
        let cursor = self
            .collection
            .find(filter.to_document())
            .sort(newest_first())
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?;
        let habits: Vec<Habit> = cursor.try_collect().await?;
        Ok(habits)
    }

    async fn get_habit(&self, id: &ObjectId) -> Result<Option<Habit>, DataError> {
        Ok(self.collection.find_one(doc! { "_id": *id }).await?)
    }

    async fn create_habit(&self, new: NewHabit) -> Result<Habit, DataError> {
        let habit = Habit::from_new(new);
        self.collection.insert_one(&habit).await?;
        tracing::debug!(habit_id = %habit.id, "Habit inserted");
        Ok(habit)
    }

    async fn update_habit(
        &self,
        id: &ObjectId,
        changes: &HabitChanges,
    ) -> Result<bool, DataError> {
        let set = changes.to_set_document();
        if set.is_empty() {
            return Ok(self.get_habit(id).await?.is_some());
        }
        let result = self
            .collection
            .update_one(doc! { "_id": *id }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_habit(&self, id: &ObjectId) -> Result<bool, DataError> {
        let result = self.collection.delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn add_completion(
        &self,
        id: &ObjectId,
        date: &str,
    ) -> Result<CompletionWrite, DataError> {
        let updated = self
            .collection
            .find_one_and_update(
                completion_guard(id, date),
                doc! { "$addToSet": { "completionHistory": date } },
            )
            .return_document(ReturnDocument::After)
            .await?;

        match updated {
            Some(habit) => Ok(CompletionWrite::Recorded(habit.completion_history)),
            None => {
                // Guard did not match: either the date is present or the habit is gone
                if self.get_habit(id).await?.is_some() {
                    Ok(CompletionWrite::AlreadyRecorded)
                } else {
                    Ok(CompletionWrite::HabitMissing)
                }
            }
        }
    }

    async fn health_check(&self) -> Result<(), DataError> {
        self.client
            .database(&self.db_name)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::debug!("MongoDB client shut down");
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}
