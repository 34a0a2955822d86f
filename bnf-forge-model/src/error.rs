use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while loading a model from its text notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        offset: usize,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("duplicate node definition: '{0}'")]
    DuplicateNode(String),
}

/// Structural problems that block generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("model must have at least one node")]
    EmptyModel,

    #[error("start node must exist in nodes (got '{0}')")]
    MissingStart(String),

    #[error("unknown node reference '{name}' in '{owner}'")]
    UnknownReference { name: String, owner: String },

    #[error("invalid node name '{0}'")]
    InvalidNodeName(String),

    #[error("union '{0}' must have at least one member")]
    EmptyUnion(String),

    #[error("invalid property name '{property}' in '{owner}'")]
    InvalidPropertyName { property: String, owner: String },

    #[error("duplicate property '{property}' in '{owner}'")]
    DuplicateProperty { property: String, owner: String },

    #[error("property name 'type' is reserved in '{0}'")]
    ReservedProperty(String),
}
