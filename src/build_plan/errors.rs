use thiserror::Error;

use crate::cypher_builder::CypherBuilderError;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Unknown {kind} '{name}' (declare it under '{section}')")]
    UnknownReference {
        kind: &'static str,
        name: String,
        section: &'static str,
    },

    #[error("Name '{0}' is declared more than once")]
    DuplicateName(String),

    #[error("Statement #{index} follows RETURN (RETURN must be the last statement)")]
    StatementAfterReturn { index: usize },

    #[error("Invalid RETURN: {0}")]
    InvalidReturn(String),

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Value {0} cannot be inlined; declare it under 'params'")]
    InlineValue(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Build error: {0}")]
    Build(#[from] CypherBuilderError),

    #[error("JSON plan error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML plan error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to read plan: {0}")]
    Io(#[from] std::io::Error),
}
