use thiserror::Error;
use uda_structured::TreeError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("unknown signal_type '{0}' (expected element, array or group)")]
    UnknownSignalType(String),
    #[error("configuration tree '{0}' carries no signal_type")]
    MissingSignalType(String),
    #[error("invalid signal name '{0}'")]
    InvalidSignalName(String),
    #[error("config: {0}")]
    Config(String),
    #[error("manipulator failed on '{signal}': {message}")]
    Manipulation { signal: String, message: String },
}
