//! # Taskwell Infrastructure
//!
//! Concrete implementations of the ports defined in `taskwell-core`:
//! JWT token sessions, Argon2 password hashing, and in-memory storage.

pub mod auth;
pub mod store;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use store::{InMemoryTaskRepository, InMemoryUserRepository};
