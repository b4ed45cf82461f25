//! Engine errors.
//!
//! | Error | Code | Defect |
//! |-------|------|--------|
//! | [`Error::Configuration`] | `GOVERN_CONFIGURATION` | Yes |
//! | [`Error::Lifecycle`] | `GOVERN_LIFECYCLE` | No |
//! | [`Error::Reentrancy`] | `GOVERN_REENTRANCY` | Yes |
//! | [`Error::ChildPropagated`] | `GOVERN_CHILD` | Inherited |
//!
//! A *defect* is a programming mistake (a malformed element, a call on a
//! disposed governor). Defects are never handed to a component's
//! `did_catch` hook; they surface at the root unchanged in kind.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the reconciliation engine or by user hooks.
///
/// `Clone` because one failure is delivered to every subscriber of the
/// failed root.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A malformed element, props payload, or option set.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A render function or lifecycle hook failed.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// An operation was attempted on a node that is already disposed.
    #[error("cannot {operation} `{node}`: node is disposed")]
    Reentrancy {
        node: String,
        operation: &'static str,
    },

    /// A child node failed and its parent did not handle the failure.
    #[error("child of `{node}` failed: {source}")]
    ChildPropagated {
        node: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Build a [`Error::Lifecycle`] from a message. Intended for user hooks.
    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::Lifecycle(message.into())
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn disposed(node: impl Into<String>, operation: &'static str) -> Self {
        Self::Reentrancy {
            node: node.into(),
            operation,
        }
    }

    pub(crate) fn child(node: impl Into<String>, source: Error) -> Self {
        Self::ChildPropagated {
            node: node.into(),
            source: Box::new(source),
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "GOVERN_CONFIGURATION",
            Self::Lifecycle(_) => "GOVERN_LIFECYCLE",
            Self::Reentrancy { .. } => "GOVERN_REENTRANCY",
            Self::ChildPropagated { .. } => "GOVERN_CHILD",
        }
    }

    /// Whether this error (or the error it wraps) is a programming defect.
    pub fn is_defect(&self) -> bool {
        match self {
            Self::Configuration(_) | Self::Reentrancy { .. } => true,
            Self::Lifecycle(_) => false,
            Self::ChildPropagated { source, .. } => source.is_defect(),
        }
    }

    /// The innermost error, following [`Error::ChildPropagated`] links.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::ChildPropagated { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
