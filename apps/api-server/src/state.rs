//! Application state - shared across all handlers.

use std::sync::Arc;

use taskwell_core::ports::{TaskRepository, UserRepository};
use taskwell_infra::{InMemoryTaskRepository, InMemoryUserRepository};

/// Shared application state.
///
/// The repositories are trait objects, so swapping the in-memory adapters
/// for a database-backed implementation is a change to this constructor
/// only.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub tasks: Arc<dyn TaskRepository>,
}

impl AppState {
    /// Build the application state with in-memory storage.
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
