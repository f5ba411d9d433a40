//! Error types for structured data trees.

use thiserror::Error;

/// Failure reported by the fetch collaborator.
///
/// Constructed by [`Fetcher`](crate::Fetcher) implementations and surfaced
/// verbatim through [`TreeError::Fetch`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("fetch of '{query}' from '{data_source}' failed: {message}")]
pub struct FetchError {
    pub query: String,
    pub data_source: String,
    pub message: String,
}

impl FetchError {
    pub fn new(
        query: impl Into<String>,
        data_source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            data_source: data_source.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TreeError {
    #[error("cannot find child '{name}' in node '{node}' (path '{path}')")]
    PathNotFound {
        path: String,
        node: String,
        name: String,
    },
    #[error("'{name}' matches {count} children of node '{node}' (path '{path}'); add an @index")]
    AmbiguousPath {
        path: String,
        node: String,
        name: String,
        count: usize,
    },
    #[error("index {index} out of range for {count} match(es) of '{name}' (path '{path}')")]
    IndexOutOfRange {
        path: String,
        name: String,
        index: i64,
        count: usize,
    },
    #[error("attribute '{attribute}' has unknown value type '{type_name}'")]
    UnknownValueType {
        attribute: String,
        type_name: String,
    },
    #[error("attribute '{attribute}' is malformed: {reason}")]
    MalformedValue {
        attribute: String,
        reason: String,
    },
    #[error("node '{node}' re-entered its own materialization")]
    ReentrantMaterialization { node: String },
    #[error("detached node '{node}' holds no materialized data")]
    DetachedUnmaterialized { node: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("codec: {0}")]
    Codec(String),
}

impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        TreeError::Codec(err.to_string())
    }
}
