//! # Taskwell API Server
//!
//! Actix-web HTTP surface over the Taskwell core: auth endpoints issuing
//! rotating token pairs, and ownership-scoped task CRUD.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod telemetry;
