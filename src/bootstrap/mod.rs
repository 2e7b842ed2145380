//! Bootstrap layer — modules that run before the chat shell starts.
//!
//! - **logger** — tracing-subscriber initialisation.

pub mod logger;
