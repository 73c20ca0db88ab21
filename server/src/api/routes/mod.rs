//! API route handlers

pub mod habits;
pub mod health;
