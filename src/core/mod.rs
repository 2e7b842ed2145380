//! Core infrastructure shared across the whole crate.
//!
//! - **config** — YAML + environment loading and resolved settings types.
//! - **error** — application-wide error enum.

pub mod config;
pub mod error;
