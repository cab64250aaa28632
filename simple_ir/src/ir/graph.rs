//! Sea-of-Nodes graph structure.
//!
//! The graph provides:
//! - **Arena-based storage**: nodes are addressed by [`NodeId`]
//! - **Bidirectional edges**: inputs and outputs are kept mutually consistent
//!   by every mutation
//! - **Dead-code retirement**: a node losing its last use is retired,
//!   cascading into its own inputs; interned constants are pinned by the
//!   constant table and only go away through an explicit [`Graph::kill`]
//! - **Simplify-on-construction**: every builder method runs the peephole
//!   engine before handing the node back
//!
//! # Edge Invariant
//!
//! For all nodes A and B, the number of input slots of A referencing B equals
//! the number of times A occurs among B's outputs. [`Graph::verify`] checks
//! this for the whole graph.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::arena::Arena;
use super::node::{ArithOp, Node, NodeFlags, NodeId, NodeKind};
use super::types::{Ty, TypeTable};
use crate::config::GraphConfig;
use crate::error::GraphError;

// =============================================================================
// Graph Structure
// =============================================================================

/// A Sea-of-Nodes graph for one compilation unit.
///
/// The graph owns every node and the type interner. Constant nodes are
/// interned: asking twice for the same literal yields the same node, and
/// that node outlives its uses.
#[derive(Clone)]
pub struct Graph {
    nodes: Arena<Node>,

    pub(crate) types: TypeTable,

    /// Live constant node per constant type.
    constants: FxHashMap<Ty, NodeId>,

    pub(crate) config: GraphConfig,

    start: NodeId,
}

impl Graph {
    /// Create a graph whose Start produces `[Ctrl, IntBot]`: the control lane
    /// and one integer argument.
    pub fn new(config: GraphConfig) -> Self {
        Self::with_signature(config, |types| vec![types.ctrl(), types.int_bot()])
    }

    /// Create a graph whose Start produces the tuple built by `lanes`.
    ///
    /// # Panics
    ///
    /// Panics if `config` does not validate.
    pub fn with_signature(config: GraphConfig, lanes: impl FnOnce(&mut TypeTable) -> Vec<Ty>) -> Self {
        if let Err(err) = config.validate() {
            panic!("invalid graph configuration: {err}");
        }

        let mut types = TypeTable::new();
        let lanes = lanes(&mut types);
        let args = types.tuple(lanes);

        let mut nodes = Arena::with_capacity(64);
        let mut start_node = Node::new(NodeKind::Start { args }, args);
        start_node.flags.insert(NodeFlags::SIMPLIFIED);
        let start = nodes.alloc(start_node);

        log::trace!("start {} : {}", start, types.display(args));

        Graph {
            nodes,
            types,
            constants: FxHashMap::default(),
            config,
            start,
        }
    }

    // =========================================================================
    // Node Access
    // =========================================================================

    /// The function entry node.
    #[inline]
    pub fn start(&self) -> NodeId {
        self.start
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    #[inline]
    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    #[inline]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Cached type of a node.
    #[inline]
    pub fn ty(&self, id: NodeId) -> Ty {
        self.nodes[id].ty
    }

    #[inline]
    pub fn inputs(&self, id: NodeId) -> &[Option<NodeId>] {
        &self.nodes[id].inputs
    }

    /// Input slot `index` of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn input(&self, id: NodeId, index: usize) -> Option<NodeId> {
        let inputs = &self.nodes[id].inputs;
        match inputs.get(index) {
            Some(&slot) => slot,
            None => panic!(
                "input index {} out of range for {} with {} inputs",
                index,
                id,
                inputs.len()
            ),
        }
    }

    #[inline]
    pub fn outputs(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].outputs
    }

    #[inline]
    pub fn use_count(&self, id: NodeId) -> usize {
        self.nodes[id].outputs.len()
    }

    #[inline]
    pub fn is_dead(&self, id: NodeId) -> bool {
        self.nodes[id].is_dead()
    }

    /// Number of nodes ever created, retired ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A graph always holds at least its Start node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over nodes that have not been retired.
    pub fn live_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().filter(|(_, node)| !node.is_dead())
    }

    pub fn live_count(&self) -> usize {
        self.live_nodes().count()
    }

    // =========================================================================
    // Def-Use Edges
    // =========================================================================

    /// Append `def` to the inputs of `node` and register the use.
    ///
    /// # Panics
    ///
    /// Panics if `def` has been retired.
    pub fn add_def(&mut self, node: NodeId, def: Option<NodeId>) -> NodeId {
        if let Some(def) = def {
            assert!(!self.is_dead(def), "{} cannot use retired node {}", node, def);
            self.nodes[def].outputs.push(node);
        }
        self.nodes[node].inputs.push(def);
        node
    }

    /// Replace input `index` of `node` with `def`, returning the old input.
    ///
    /// The old input is retired if this was its last use.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or `def` has been retired.
    pub fn set_def(&mut self, node: NodeId, index: usize, def: Option<NodeId>) -> Option<NodeId> {
        let old = self.input(node, index);
        if old == def {
            return old;
        }

        // Register the new use first so moving a value between slots never
        // retires it.
        if let Some(def) = def {
            assert!(!self.is_dead(def), "{} cannot use retired node {}", node, def);
            self.nodes[def].outputs.push(node);
        }
        self.nodes[node].inputs[index] = def;

        if let Some(old) = old {
            self.del_use(old, node);
            self.retire_if_unused(old);
        }
        old
    }

    /// Remove the last `count` inputs of `node`, retiring inputs that lose
    /// their last use.
    ///
    /// # Panics
    ///
    /// Panics if `node` has fewer than `count` inputs.
    pub fn pop_n(&mut self, node: NodeId, count: usize) {
        let len = self.nodes[node].inputs.len();
        assert!(
            count <= len,
            "pop_n({}) on {} which has only {} inputs",
            count,
            node,
            len
        );
        for _ in 0..count {
            if let Some(old) = self.nodes[node].inputs.pop().flatten() {
                self.del_use(old, node);
                self.retire_if_unused(old);
            }
        }
    }

    /// Drop one occurrence of `user` from the outputs of `def`.
    fn del_use(&mut self, def: NodeId, user: NodeId) {
        let outputs = &mut self.nodes[def].outputs;
        let Some(pos) = outputs.iter().position(|&u| u == user) else {
            panic!("edge mismatch: {} is not a use of {}", user, def);
        };
        outputs.swap_remove(pos);
    }

    // =========================================================================
    // Retirement
    // =========================================================================

    fn retire_if_unused(&mut self, id: NodeId) {
        if self.nodes[id].is_retirable() {
            self.kill(id);
        }
    }

    /// Retire an unused node, then every input that becomes unused as a
    /// result and is not protected, kept, or an interned constant.
    ///
    /// Retiring a constant explicitly drops it from the constant table; the
    /// next request for that literal builds a fresh node.
    ///
    /// # Panics
    ///
    /// Panics if the node still has uses, is already retired, or is Start.
    pub fn kill(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        assert!(!node.is_dead(), "{} is already retired", id);
        assert!(
            node.is_unused(),
            "cannot retire {} while it has {} uses",
            id,
            node.outputs.len()
        );
        assert!(id != self.start, "the start node cannot be retired");

        let mut worklist = vec![id];
        while let Some(id) = worklist.pop() {
            log::debug!("retire {} {}", id, self.nodes[id].kind.name());

            let node = &mut self.nodes[id];
            node.flags.insert(NodeFlags::DEAD);
            let inputs = std::mem::take(&mut node.inputs);
            if let NodeKind::Constant(ty) = node.kind {
                if self.constants.get(&ty) == Some(&id) {
                    self.constants.remove(&ty);
                }
            }

            for input in inputs.into_iter().flatten() {
                self.del_use(input, id);
                if self.nodes[input].is_retirable() {
                    worklist.push(input);
                }
            }
        }
    }

    /// Exempt a node from retirement until [`Graph::unkeep`].
    pub fn keep(&mut self, id: NodeId) -> NodeId {
        self.nodes[id].flags.insert(NodeFlags::KEEP);
        id
    }

    /// Lift a [`Graph::keep`]; the node is retired now if it is unused.
    pub fn unkeep(&mut self, id: NodeId) -> NodeId {
        self.nodes[id].flags.remove(NodeFlags::KEEP);
        self.retire_if_unused(id);
        id
    }

    #[inline]
    pub(crate) fn set_type(&mut self, id: NodeId, ty: Ty) {
        self.nodes[id].ty = ty;
    }

    #[inline]
    pub(crate) fn mark(&mut self, id: NodeId, flags: NodeFlags) {
        self.nodes[id].flags.insert(flags);
    }

    /// Point every use of `old` at `new` instead, then retire `old`.
    ///
    /// `new` survives even if retiring `old` removes its last use.
    pub fn subsume(&mut self, old: NodeId, new: NodeId) {
        assert_ne!(old, new, "cannot subsume {} into itself", old);
        assert!(!self.is_dead(new), "cannot subsume {} into retired node {}", old, new);

        let users = std::mem::take(&mut self.nodes[old].outputs);
        for user in users {
            let inputs = &mut self.nodes[user].inputs;
            let Some(slot) = inputs.iter().position(|&i| i == Some(old)) else {
                panic!("edge mismatch: {} is not a use of {}", user, old);
            };
            inputs[slot] = Some(new);
            self.nodes[new].outputs.push(user);
        }

        if self.nodes[old].kind.is_protected() {
            return;
        }
        let was_kept = self.nodes[new].flags.contains(NodeFlags::KEEP);
        self.nodes[new].flags.insert(NodeFlags::KEEP);
        self.kill(old);
        if !was_kept {
            self.nodes[new].flags.remove(NodeFlags::KEEP);
        }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Allocate a node and wire its inputs. The caller runs the peephole.
    fn alloc(&mut self, kind: NodeKind, inputs: &[Option<NodeId>]) -> NodeId {
        let id = self.nodes.alloc(Node::new(kind, self.types.top()));
        for &input in inputs {
            self.add_def(id, input);
        }
        log::trace!("new {} {} {:?}", id, self.nodes[id].kind.name(), inputs);
        id
    }

    /// The interned constant node for a constant type.
    ///
    /// # Panics
    ///
    /// Panics if `ty` is not a constant type.
    pub fn constant(&mut self, ty: Ty) -> NodeId {
        assert!(
            self.types.is_constant(ty),
            "constant node requires a constant type, got {}",
            self.types.display(ty)
        );
        if let Some(&id) = self.constants.get(&ty) {
            return id;
        }
        let id = self.alloc(NodeKind::Constant(ty), &[]);
        self.constants.insert(ty, id);
        self.peephole(id)
    }

    /// The constant node for an integer literal.
    pub fn int(&mut self, value: i64) -> NodeId {
        let ty = self.types.int(value);
        self.constant(ty)
    }

    /// The existing projection of `lane` among the uses of `multi`.
    pub fn proj(&self, multi: NodeId, lane: usize) -> Option<NodeId> {
        self.outputs(multi)
            .iter()
            .copied()
            .find(|&user| matches!(self.nodes[user].kind, NodeKind::Proj { lane: l, .. } if l == lane))
    }

    /// Build a projection of `lane` out of `multi`.
    ///
    /// # Panics
    ///
    /// Panics if the type of `multi` is not a tuple with more than `lane`
    /// components.
    pub fn new_proj(&mut self, multi: NodeId, lane: usize, label: &str) -> NodeId {
        let label: Arc<str> = Arc::from(label);
        let id = self.alloc(NodeKind::Proj { lane, label }, &[Some(multi)]);
        self.peephole(id)
    }

    /// Build a return of `value` under control `ctrl`.
    pub fn ret(&mut self, ctrl: NodeId, value: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Return, &[Some(ctrl), Some(value)]);
        self.peephole(id)
    }

    /// Build a binary arithmetic node.
    pub fn arith(&mut self, op: ArithOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Arith(op), &[None, Some(lhs), Some(rhs)]);
        self.peephole(id)
    }

    pub fn add(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.arith(ArithOp::Add, lhs, rhs)
    }

    pub fn sub(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.arith(ArithOp::Sub, lhs, rhs)
    }

    pub fn mul(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.arith(ArithOp::Mul, lhs, rhs)
    }

    pub fn div(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.arith(ArithOp::Div, lhs, rhs)
    }

    /// Build an integer negation.
    pub fn minus(&mut self, value: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Minus, &[None, Some(value)]);
        self.peephole(id)
    }

    /// Build an empty Scope node.
    pub(crate) fn new_scope_node(&mut self) -> NodeId {
        let id = self.alloc(NodeKind::Scope, &[]);
        self.peephole(id)
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Check def-use symmetry and that no live node references a retired one.
    pub fn verify(&self) -> Result<(), GraphError> {
        for (id, node) in self.nodes.iter() {
            if node.is_dead() {
                if !node.inputs.is_empty() || !node.outputs.is_empty() {
                    return Err(GraphError::DeadNodeHasEdges(id));
                }
                continue;
            }

            for def in node.inputs.iter().flatten().copied() {
                if self.nodes[def].is_dead() {
                    return Err(GraphError::UseOfDeadNode { def, user: id });
                }
                let inputs = node.inputs.iter().filter(|&&i| i == Some(def)).count();
                let outputs = self.nodes[def].outputs.iter().filter(|&&u| u == id).count();
                if inputs != outputs {
                    return Err(GraphError::EdgeMismatch {
                        def,
                        user: id,
                        inputs,
                        outputs,
                    });
                }
            }

            for &user in node.outputs.iter() {
                if !self.nodes[user].inputs.contains(&Some(id)) {
                    return Err(GraphError::DanglingOutput { def: id, user });
                }
            }
        }
        Ok(())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph ({} live of {} nodes):", self.live_count(), self.len())?;
        for (id, node) in self.live_nodes() {
            writeln!(
                f,
                "  {:?}: {} {:?} -> {:?} : {}",
                id,
                node.kind.name(),
                node.inputs(),
                node.outputs(),
                self.types.display(node.ty)
            )?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
