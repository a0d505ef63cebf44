//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;

pub use auth::{
    AccessClaims, AuthError, PasswordService, SessionState, TokenPair, TokenService,
};
pub use repository::{TaskFilter, TaskPage, TaskRepository, UserRepository};
