//! Sea-of-Nodes Intermediate Representation.
//!
//! Control flow, data flow, and values live in one graph whose edges are
//! kept bidirectional, so every node knows both its operands and its users.
//!
//! # Core Components
//!
//! - **Arena** (`arena.rs`): typed index handles and append-only storage
//! - **Types** (`types.rs`): interned value lattice with `meet`
//! - **Node** (`node.rs`): node kinds, flags, and lifecycle
//! - **Graph** (`graph.rs`): def-use bookkeeping, construction, retirement
//! - **Peephole** (`peephole.rs`): type computation and local rewrites run on
//!   every freshly built node
//! - **Scope** (`scope.rs`): lexical name resolution over a Scope node
//! - **Printer** (`printer.rs`): expression and listing renderers
//! - **Builder** (`builder.rs`): graph plus scope, as a parser drives them
//!
//! # Design Principles
//!
//! - **Arena allocation**: nodes are addressed by index; cycles cost nothing
//! - **Simplify on construction**: callers only ever see simplified nodes
//! - **Use counts as liveness**: a node losing its last use is retired

pub mod arena;
pub mod builder;
pub mod graph;
pub mod node;
pub mod peephole;
pub mod printer;
pub mod scope;
pub mod types;

// Re-export commonly used types
pub use arena::{Arena, Id};
pub use builder::GraphBuilder;
pub use graph::Graph;
pub use node::{ArithOp, InputList, Node, NodeFlags, NodeId, NodeKind, NodeState, OutputList};
pub use printer::GraphPrinter;
pub use scope::Scope;
pub use types::{IntType, Ty, Type, TypeDisplay, TypeTable};
