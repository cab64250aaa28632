//! Parser-facing construction facade.
//!
//! A [`GraphBuilder`] bundles the graph of one function with its lexical
//! scope. On creation it opens the outermost frame and binds the control
//! projection of Start as `$ctrl` and the first argument as `arg`, so a parser
//! can resolve both like ordinary identifiers.

use super::graph::Graph;
use super::node::NodeId;
use super::scope::Scope;
use crate::config::GraphConfig;
use crate::error::ScopeError;

/// Graph plus scope for building one function body.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    graph: Graph,
    scope: Scope,
}

impl GraphBuilder {
    pub fn new(config: GraphConfig) -> Self {
        let mut graph = Graph::new(config);
        let mut scope = Scope::new(&mut graph);
        scope.push();

        let start = graph.start();
        let ctrl = graph.new_proj(start, 0, Scope::CTRL);
        let arg = graph.new_proj(start, 1, Scope::ARG0);
        for (name, value) in [(Scope::CTRL, ctrl), (Scope::ARG0, arg)] {
            if let Err(err) = scope.define(&mut graph, name, value) {
                panic!("fresh outer frame rejected a binding: {err}");
            }
        }

        GraphBuilder { graph, scope }
    }

    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    #[inline]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Consume the builder, keeping the graph.
    pub fn finish(self) -> Graph {
        self.graph
    }

    // =========================================================================
    // Names
    // =========================================================================

    pub fn push_scope(&mut self) {
        self.scope.push();
    }

    pub fn pop_scope(&mut self) {
        self.scope.pop(&mut self.graph);
    }

    pub fn define(&mut self, name: &str, value: NodeId) -> Result<NodeId, ScopeError> {
        self.scope.define(&mut self.graph, name, value)
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.scope.lookup(&self.graph, name)
    }

    pub fn update(&mut self, name: &str, value: NodeId) -> Option<NodeId> {
        self.scope.update(&mut self.graph, name, value)
    }

    /// The current control node.
    ///
    /// # Panics
    ///
    /// Panics if `$ctrl` has been unbound by popping the outermost frame.
    pub fn ctrl(&self) -> NodeId {
        match self.lookup(Scope::CTRL) {
            Some(ctrl) => ctrl,
            None => panic!("`{}` is not bound", Scope::CTRL),
        }
    }

    /// The first function argument, as currently bound.
    pub fn arg(&self) -> Option<NodeId> {
        self.lookup(Scope::ARG0)
    }

    /// Render the scope's frames.
    pub fn print_scope(&self) -> String {
        self.scope.print(&self.graph)
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    pub fn int(&mut self, value: i64) -> NodeId {
        self.graph.int(value)
    }

    pub fn add(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.graph.add(lhs, rhs)
    }

    pub fn sub(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.graph.sub(lhs, rhs)
    }

    pub fn mul(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.graph.mul(lhs, rhs)
    }

    pub fn div(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.graph.div(lhs, rhs)
    }

    pub fn minus(&mut self, value: NodeId) -> NodeId {
        self.graph.minus(value)
    }

    /// Return `value` under the current control.
    pub fn ret(&mut self, value: NodeId) -> NodeId {
        let ctrl = self.ctrl();
        self.graph.ret(ctrl, value)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
