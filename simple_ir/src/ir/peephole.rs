//! Simplify-on-construction.
//!
//! Every builder method hands its fresh node to [`Graph::peephole`] before
//! returning it. The engine:
//!
//! 1. recomputes the node's type from its inputs ([`Graph::compute`]) and
//!    checks that it only moved down the lattice;
//! 2. replaces a non-constant node whose type is a constant by the interned
//!    constant node;
//! 3. otherwise asks [`Graph::idealize`] for an equivalent existing node;
//! 4. on a replacement, rewires every use and retires the original, then
//!    starts over on the replacement.
//!
//! Rules never allocate anything but interned constants (which have no
//! inputs), so each rewrite strictly shrinks the graph reachable from the
//! rewrite site and the loop terminates.

use super::graph::Graph;
use super::node::{ArithOp, NodeFlags, NodeId, NodeKind};
use super::types::{IntType, Ty};

impl Graph {
    /// Compute the type of `id` from the cached types of its inputs.
    ///
    /// Does not touch the graph; it may intern new types.
    ///
    /// # Panics
    ///
    /// Panics if `id` is a projection whose input is not a tuple with enough
    /// lanes.
    pub fn compute(&mut self, id: NodeId) -> Ty {
        match self.kind(id) {
            NodeKind::Start { args } => *args,
            NodeKind::Constant(ty) => *ty,
            NodeKind::Return | NodeKind::Scope => self.types.bottom(),
            NodeKind::Proj { lane, .. } => {
                let lane = *lane;
                let Some(multi) = self.input(id, 0) else {
                    panic!("projection {} has no input", id);
                };
                self.types.at(self.ty(multi), lane)
            }
            NodeKind::Arith(op) => {
                let op = *op;
                let lhs = self.int_input(id, 1);
                let rhs = self.int_input(id, 2);
                match (lhs, rhs) {
                    (IntType::Const(a), IntType::Const(b)) => match op.eval(a, b) {
                        Some(v) => self.types.int(v),
                        None => self.types.int_bot(),
                    },
                    (IntType::Top, _) | (_, IntType::Top) => self.types.int_top(),
                    _ => self.types.int_bot(),
                }
            }
            NodeKind::Minus => match self.int_input(id, 1) {
                IntType::Const(v) => self.types.int(v.wrapping_neg()),
                IntType::Top => self.types.int_top(),
                IntType::Bot => self.types.int_bot(),
            },
        }
    }

    /// An input's type on the integer sub-lattice; a missing input is `Top`.
    fn int_input(&self, id: NodeId, slot: usize) -> IntType {
        match self.inputs(id).get(slot).copied().flatten() {
            Some(def) => self.types.as_int_type(self.ty(def)),
            None => IntType::Top,
        }
    }

    /// Constant value of a node, from its cached type.
    fn int_value(&self, id: NodeId) -> Option<i64> {
        self.types.as_int(self.ty(id))
    }

    /// Propose an existing node equivalent to `id`, or `None`.
    pub fn idealize(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Arith(op) => {
                let op = *op;
                let mut lhs = self.input(id, 1)?;
                let mut rhs = self.input(id, 2)?;
                // Commutative rules are stated with the constant on the right.
                if op.is_commutative() && self.int_value(lhs).is_some() && self.int_value(rhs).is_none() {
                    std::mem::swap(&mut lhs, &mut rhs);
                }
                match (op, self.int_value(rhs)) {
                    (ArithOp::Add | ArithOp::Sub, Some(0)) => Some(lhs),
                    (ArithOp::Mul | ArithOp::Div, Some(1)) => Some(lhs),
                    // x*0 becomes the zero operand itself.
                    (ArithOp::Mul, Some(0)) => Some(rhs),
                    _ => None,
                }
            }
            NodeKind::Minus => {
                let value = self.input(id, 1)?;
                match self.kind(value) {
                    NodeKind::Minus => self.input(value, 1),
                    _ => None,
                }
            }
            NodeKind::Start { .. }
            | NodeKind::Proj { .. }
            | NodeKind::Return
            | NodeKind::Constant(_)
            | NodeKind::Scope => None,
        }
    }

    /// Run the engine on `id` until no rule applies; returns the surviving
    /// node.
    ///
    /// # Panics
    ///
    /// Panics if a type moves up the lattice, if the rewrite bound is
    /// exceeded, or (with `verify_edges`) if the graph is inconsistent
    /// afterwards.
    pub fn peephole(&mut self, id: NodeId) -> NodeId {
        let mut current = id;
        let mut rewrites = 0;
        loop {
            self.refresh_type(current);

            let replacement = if !self.config.peephole {
                None
            } else if !self.node(current).is_constant() && self.types.is_constant(self.ty(current)) {
                let ty = self.ty(current);
                Some(self.constant(ty))
            } else {
                self.idealize(current)
            };

            let Some(replacement) = replacement else {
                self.finish_peephole(current);
                return current;
            };
            assert!(
                rewrites < self.config.max_peephole_iterations,
                "peephole on {} did not reach a fixpoint within {} rewrites",
                id,
                self.config.max_peephole_iterations
            );
            rewrites += 1;

            log::debug!(
                "peephole {} {} => {} {}",
                current,
                self.kind(current).name(),
                replacement,
                self.kind(replacement).name()
            );
            self.subsume(current, replacement);
            current = replacement;
        }
    }

    /// Store a freshly computed type, asserting monotonicity.
    fn refresh_type(&mut self, id: NodeId) {
        let old = self.ty(id);
        let new = self.compute(id);
        assert!(
            self.types.is_at_or_below(old, new),
            "type of {} moved up the lattice: {} -> {}",
            id,
            self.types.display(old),
            self.types.display(new)
        );
        self.set_type(id, new);
    }

    fn finish_peephole(&mut self, id: NodeId) {
        self.mark(id, NodeFlags::SIMPLIFIED);
        if self.config.verify_edges {
            if let Err(err) = self.verify() {
                panic!("graph inconsistent after building {}: {}", id, err);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
