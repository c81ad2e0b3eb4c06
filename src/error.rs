use thiserror::Error;

/// Errors raised while configuring, fitting or querying a topic model.
#[derive(Debug, Error)]
pub enum LdaError {
    #[error("invalid configuration: {param} = {value} ({constraint})")]
    InvalidConfig {
        param: String,
        value: String,
        constraint: String,
    },

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("word id {0} has no entry in the vocabulary")]
    UnknownWord(usize),

    #[error("no embedding for word {token:?} (id {word_id})")]
    MissingEmbedding { word_id: usize, token: String },

    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    #[error("model has not been fitted yet")]
    NotFitted,

    #[error("embedding file line {line}: {message}")]
    EmbeddingParse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LdaError {
    pub(crate) fn invalid_config(param: &str, value: impl ToString, constraint: &str) -> Self {
        LdaError::InvalidConfig {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    pub(crate) fn shape(expected: impl ToString, actual: impl ToString) -> Self {
        LdaError::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LdaError>;
