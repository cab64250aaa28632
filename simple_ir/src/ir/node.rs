//! IR node definitions for the Sea-of-Nodes IR.
//!
//! Sea-of-Nodes represents data flow and control flow uniformly as edges
//! between nodes. Each node has:
//! - **Kind**: what the node computes, with kind-specific fields
//! - **Inputs**: ordered operands; slot 0 is the control input for nodes
//!   that depend on control
//! - **Outputs**: every node using this one, once per referencing slot
//! - **Type**: the cached result of the last lattice computation
//!
//! # Control vs Data Nodes
//!
//! - **Control nodes**: Start, Return, and the control projection of Start
//! - **Data nodes**: Constant, arithmetic, and value projections
//! - **Scope**: parser bookkeeping; keeps bound values alive

use std::sync::Arc;

use smallvec::SmallVec;

use super::arena::Id;
use super::types::Ty;

/// Unique identifier for a node in the graph.
pub type NodeId = Id<Node>;

/// Input slots. `None` is the placeholder for "no value yet".
pub type InputList = SmallVec<[Option<NodeId>; 4]>;

/// Use edges. A user appears once for every input slot referencing the node.
pub type OutputList = SmallVec<[NodeId; 4]>;

// =============================================================================
// Operators
// =============================================================================

/// Binary integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    /// Source-level operator symbol.
    pub const fn symbol(self) -> char {
        match self {
            ArithOp::Add => '+',
            ArithOp::Sub => '-',
            ArithOp::Mul => '*',
            ArithOp::Div => '/',
        }
    }

    /// Fold two constants. Division by zero does not fold.
    pub const fn eval(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            ArithOp::Add => Some(lhs.wrapping_add(rhs)),
            ArithOp::Sub => Some(lhs.wrapping_sub(rhs)),
            ArithOp::Mul => Some(lhs.wrapping_mul(rhs)),
            ArithOp::Div => {
                if rhs == 0 {
                    None
                } else {
                    Some(lhs.wrapping_div(rhs))
                }
            }
        }
    }

    #[inline]
    pub const fn is_commutative(self) -> bool {
        matches!(self, ArithOp::Add | ArithOp::Mul)
    }
}

// =============================================================================
// Node Kind
// =============================================================================

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Function entry; its type is the tuple of incoming lanes.
    Start { args: Ty },
    /// Extracts one lane of a multi-valued input.
    Proj { lane: usize, label: Arc<str> },
    /// Terminal control node: `[ctrl, value]`.
    Return,
    /// A literal; always carries a constant type.
    Constant(Ty),
    /// Live bindings of the parser's lexical scopes.
    Scope,
    /// `[ctrl, lhs, rhs]`.
    Arith(ArithOp),
    /// Integer negation: `[ctrl, value]`.
    Minus,
}

impl NodeKind {
    /// Short name of the kind.
    pub const fn name(&self) -> &'static str {
        match self {
            NodeKind::Start { .. } => "Start",
            NodeKind::Proj { .. } => "Proj",
            NodeKind::Return => "Return",
            NodeKind::Constant(_) => "Con",
            NodeKind::Scope => "Scope",
            NodeKind::Arith(ArithOp::Add) => "Add",
            NodeKind::Arith(ArithOp::Sub) => "Sub",
            NodeKind::Arith(ArithOp::Mul) => "Mul",
            NodeKind::Arith(ArithOp::Div) => "Div",
            NodeKind::Minus => "Minus",
        }
    }

    /// Roots that stay alive without any use.
    #[inline]
    pub const fn is_protected(&self) -> bool {
        matches!(self, NodeKind::Start { .. } | NodeKind::Return | NodeKind::Scope)
    }
}

// =============================================================================
// Node
// =============================================================================

/// Lifecycle of a node. Only ever advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeState {
    UnderConstruction,
    Simplified,
    Dead,
}

/// A node in the Sea-of-Nodes graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// What this node computes.
    pub kind: NodeKind,

    pub(crate) inputs: InputList,

    pub(crate) outputs: OutputList,

    /// Cached lattice value.
    pub(crate) ty: Ty,

    pub(crate) flags: NodeFlags,
}

impl Node {
    /// A detached node with the given starting type.
    pub(crate) fn new(kind: NodeKind, ty: Ty) -> Self {
        Node {
            kind,
            inputs: InputList::new(),
            outputs: OutputList::new(),
            ty,
            flags: NodeFlags::empty(),
        }
    }

    #[inline]
    pub fn inputs(&self) -> &[Option<NodeId>] {
        &self.inputs
    }

    #[inline]
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    #[inline]
    pub fn ty(&self) -> Ty {
        self.ty
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.flags.contains(NodeFlags::DEAD)
    }

    #[inline]
    pub fn is_unused(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn state(&self) -> NodeState {
        if self.flags.contains(NodeFlags::DEAD) {
            NodeState::Dead
        } else if self.flags.contains(NodeFlags::SIMPLIFIED) {
            NodeState::Simplified
        } else {
            NodeState::UnderConstruction
        }
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, NodeKind::Constant(_))
    }

    /// Whether losing its last use retires this node.
    ///
    /// Constants are pinned by the graph's constant table: a handle returned
    /// by `Graph::int` stays valid while the caller holds it unused, even if
    /// another use of the same literal goes away.
    #[inline]
    pub(crate) fn is_retirable(&self) -> bool {
        !self.is_dead()
            && self.outputs.is_empty()
            && !self.kind.is_protected()
            && !self.is_constant()
            && !self.flags.contains(NodeFlags::KEEP)
    }
}

// =============================================================================
// Node Flags
// =============================================================================

bitflags::bitflags! {
    /// Lifecycle and bookkeeping flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// The peephole engine reached a fixpoint on this node.
        const SIMPLIFIED = 0b0000_0001;
        /// Retired; never revived.
        const DEAD = 0b0000_0010;
        /// Temporarily exempt from retirement.
        const KEEP = 0b0000_0100;
    }
}

// =============================================================================
// Tests
// =============================================================================
