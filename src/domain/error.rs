//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Errors raised by the tree engine and by children providers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Failure inside a manager's `update_children`, or a broken manager contract
    #[error("manager error: {0}")]
    Manager(String),

    #[error("path format error: {0}")]
    PathFormat(String),

    #[error("unknown error: {0}")]
    Unknown(String),

    #[error("node {0} is not part of this tree")]
    StaleNode(NodeId),
}

impl TreeError {
    pub fn manager(msg: impl Into<String>) -> Self {
        Self::Manager(msg.into())
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
