//! Storage adapters.

mod memory;

pub use memory::{InMemoryTaskRepository, InMemoryUserRepository};
