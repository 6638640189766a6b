#![doc = "The `taskkeeper` library crate."]
#![doc = ""]
#![doc = "Users register, log in with email and password, and manage their own to-do items"]
#![doc = "through a JSON API. Authentication uses short-lived access tokens and longer-lived"]
#![doc = "refresh tokens; every task operation is scoped to the task's owner."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use crate::auth::TokenService;
use crate::store::Store;

/// Shared, read-only state handed to every request through `web::Data`.
///
/// The store's connection pool is the only thing requests share.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }
}
