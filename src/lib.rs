// ABOUTME: Library root for deployment-gate - exposes the gate, its collaborators and types.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod github;
pub mod http;
pub mod orchestrator;
pub mod output;
pub mod retry;
pub mod types;
