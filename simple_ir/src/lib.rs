//! Sea-of-Nodes IR core for a small compiler.
//!
//! The crate provides:
//! - an interned type lattice used to compute statically known values
//! - a node graph with bidirectional def-use edges and dead-code retirement
//! - a peephole engine that folds and simplifies nodes as they are built
//! - lexical scopes whose bindings keep their values alive in the graph
//!
//! ```
//! use simple_ir::{GraphBuilder, GraphConfig};
//!
//! let mut builder = GraphBuilder::new(GraphConfig::default());
//! let two = builder.int(2);
//! let three = builder.int(3);
//! let product = builder.mul(two, three);
//! let one = builder.int(1);
//! let sum = builder.add(one, product);
//! let ret = builder.ret(sum);
//!
//! assert_eq!(builder.graph().print(ret), "return 7;");
//! ```
//!
//! The library logs through the `log` facade and installs no logger.

pub mod config;
pub mod error;
pub mod ir;

pub use config::{ConfigError, GraphConfig};
pub use error::{GraphError, ScopeError};
pub use ir::{
    ArithOp, Graph, GraphBuilder, GraphPrinter, IntType, Node, NodeId, NodeKind, NodeState, Scope, Ty,
    Type, TypeTable,
};
