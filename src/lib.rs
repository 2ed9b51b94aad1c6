//! Execution planning and agent session coordination for epics, features and tasks.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod mcp;
pub mod models;
pub mod progress;
pub mod scheduler;
pub mod session;
