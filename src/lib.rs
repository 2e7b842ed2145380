// Library root — exposes the shell's building blocks for integration tests.
// The binary entry point is src/main.rs.

pub mod bootstrap;
pub mod chat;
pub mod core;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod ui;

pub use crate::core::{config, error};
pub use bootstrap::logger;
