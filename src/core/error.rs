//! Application-wide error types.

use thiserror::Error;

use crate::graph::GraphError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("agent graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("memory error: {0}")]
    Memory(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderError;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing key primary_agent.llm".into());
        assert!(e.to_string().starts_with("config error"));
        assert!(e.to_string().contains("primary_agent.llm"));
    }

    #[test]
    fn memory_error_display() {
        let e = AppError::Memory("cannot write memory/1.jsonl".into());
        assert!(e.to_string().contains("memory/1.jsonl"));
    }

    #[test]
    fn graph_error_keeps_source_message() {
        let e: AppError = GraphError::Provider(ProviderError::Request("HTTP 500: boom".into())).into();
        assert!(e.to_string().contains("HTTP 500: boom"));
        assert!(matches!(e, AppError::Graph(GraphError::Provider(_))));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
