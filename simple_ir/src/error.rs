//! Recoverable error types.
//!
//! Structural violations (bad input indices, popping an empty scope stack,
//! projecting a non-tuple) are bugs in the caller and panic at the point of
//! detection. The types here cover the cases a driver is expected to handle.

use std::sync::Arc;

use thiserror::Error;

use crate::ir::NodeId;

/// Name-binding conflicts reported by [`Scope`](crate::ir::Scope).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The name is already bound in the innermost frame.
    #[error("`{0}` is already defined in this scope")]
    AlreadyDefined(Arc<str>),
}

/// Def-use inconsistencies found by [`Graph::verify`](crate::ir::Graph::verify).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// `user` references `def` in a different number of input slots than
    /// `def` lists `user` among its outputs.
    #[error("edge mismatch: {user} uses {def} in {inputs} input slot(s) but is listed {outputs} time(s) as an output")]
    EdgeMismatch {
        def: NodeId,
        user: NodeId,
        inputs: usize,
        outputs: usize,
    },

    /// `def` lists `user` as an output but `user` has no input pointing back.
    #[error("dangling output: {def} lists {user} as a use, but {user} does not reference it")]
    DanglingOutput { def: NodeId, user: NodeId },

    /// A live node references a retired one.
    #[error("{user} references retired node {def}")]
    UseOfDeadNode { def: NodeId, user: NodeId },

    /// A retired node still carries edges.
    #[error("retired node {0} still has edges")]
    DeadNodeHasEdges(NodeId),
}
