//! Business rules sitting between the HTTP routes and the store.

pub mod auth;
pub mod tasks;
