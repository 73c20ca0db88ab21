//! Requester identity and ownership policy
//!
//! The requester is identified by a client-supplied email. Nothing verifies
//! it; the check is an equality test kept behind `OwnershipPolicy` so a
//! verified identity can replace it without touching handlers.

use crate::data::types::Habit;

/// Identity of the caller performing a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub email: String,
}

impl Requester {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Decides whether a requester may modify a habit
pub trait OwnershipPolicy: Send + Sync {
    fn may_modify(&self, requester: &Requester, habit: &Habit) -> bool;

    /// Policy name for logging
    fn name(&self) -> &'static str;
}

/// Owner email must equal the requester email exactly
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailMatchPolicy;

impl OwnershipPolicy for EmailMatchPolicy {
    fn may_modify(&self, requester: &Requester, habit: &Habit) -> bool {
        habit.user_email == requester.email
    }

    fn name(&self) -> &'static str {
        "email-match"
    }
}
