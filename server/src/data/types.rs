//! Shared data types across storage backends
//!
//! Habit documents use camelCase field names so documents written by
//! earlier clients of the collection deserialize unchanged.

use bson::oid::ObjectId;
use bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

/// Habit document as stored in the `habits` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub completion_history: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl Habit {
    /// Build a stored habit from creation input, assigning id and timestamp
    pub fn from_new(new: NewHabit) -> Self {
        Self {
            id: ObjectId::new(),
            user_email: new.user_email,
            title: new.title,
            description: new.description,
            category: new.category,
            reminder_time: new.reminder_time,
            image: new.image,
            completion_history: Vec::new(),
            created_at: Some(DateTime::now()),
        }
    }
}

/// Input for creating a habit
#[derive(Debug, Clone, Default)]
pub struct NewHabit {
    pub user_email: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub reminder_time: Option<String>,
    pub image: Option<String>,
}

/// Partial update of the editable habit fields
///
/// `None` leaves a field untouched. Empty strings are dropped by
/// `retain_non_empty` so they never overwrite stored values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub reminder_time: Option<String>,
    pub image: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl HabitChanges {
    pub fn retain_non_empty(self) -> Self {
        Self {
            title: non_empty(self.title),
            description: non_empty(self.description),
            category: non_empty(self.category),
            reminder_time: non_empty(self.reminder_time),
            image: non_empty(self.image),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.reminder_time.is_none()
            && self.image.is_none()
    }

    /// `$set` body for the document store
    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(ref title) = self.title {
            set.insert("title", title.clone());
        }
        if let Some(ref description) = self.description {
            set.insert("description", description.clone());
        }
        if let Some(ref category) = self.category {
            set.insert("category", category.clone());
        }
        if let Some(ref reminder_time) = self.reminder_time {
            set.insert("reminderTime", reminder_time.clone());
        }
        if let Some(ref image) = self.image {
            set.insert("image", image.clone());
        }
        set
    }

    /// Apply the changes to an in-memory habit
    pub fn apply(&self, habit: &mut Habit) {
        if let Some(ref title) = self.title {
            habit.title = title.clone();
        }
        if self.description.is_some() {
            habit.description = self.description.clone();
        }
        if self.category.is_some() {
            habit.category = self.category.clone();
        }
        if self.reminder_time.is_some() {
            habit.reminder_time = self.reminder_time.clone();
        }
        if self.image.is_some() {
            habit.image = self.image.clone();
        }
    }
}

/// Exact-match filters for listing habits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitFilter {
    pub user_email: Option<String>,
    pub category: Option<String>,
}

impl HabitFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(ref email) = self.user_email {
            filter.insert("userEmail", email.clone());
        }
        if let Some(ref category) = self.category {
            filter.insert("category", category.clone());
        }
        filter
    }

    pub fn matches(&self, habit: &Habit) -> bool {
        self.user_email
            .as_ref()
            .is_none_or(|email| habit.user_email == *email)
            && self
                .category
                .as_ref()
                .is_none_or(|category| habit.category.as_ref() == Some(category))
    }
}

/// Outcome of an atomic append-if-absent on the completion history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionWrite {
    /// Date appended; carries the history after the write
    Recorded(Vec<String>),
    /// Date was already present, nothing written
    AlreadyRecorded,
    /// No habit with that id
    HabitMissing,
}

/// Filter matching a habit that does not yet contain `date`
pub fn completion_guard(id: &ObjectId, date: &str) -> Document {
    doc! {
        "_id": *id,
        "completionHistory": { "$ne": date },
    }
}
