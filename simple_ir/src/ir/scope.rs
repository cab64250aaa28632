//! Lexical name resolution for graph construction.
//!
//! A [`Scope`] is a stack of frames mapping identifiers to input slots of a
//! Scope node in the graph. Bound values are ordinary inputs of that node, so
//! they stay alive exactly as long as some frame binds them; popping a frame
//! drops its slots and retires whatever loses its last use. Interned
//! constants are the exception: they outlive their bindings.
//!
//! Frames only ever append slots, so the bindings of the innermost frame are
//! always the trailing inputs of the Scope node.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::graph::Graph;
use super::node::NodeId;
use crate::error::ScopeError;

/// One lexical level: name to input slot of the Scope node.
type Frame = FxHashMap<Arc<str>, usize>;

/// Stack of lexical frames over a Scope node.
#[derive(Debug, Clone)]
pub struct Scope {
    node: NodeId,
    frames: Vec<Frame>,
}

impl Scope {
    /// Name bound to the current control node.
    pub const CTRL: &'static str = "$ctrl";

    /// Name bound to the first function argument.
    pub const ARG0: &'static str = "arg";

    /// Create a scope with no open frame, backed by a new Scope node.
    pub fn new(graph: &mut Graph) -> Self {
        Scope {
            node: graph.new_scope_node(),
            frames: Vec::new(),
        }
    }

    /// The Scope node holding the live bindings.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Number of open frames.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Open a new innermost frame.
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Close the innermost frame, releasing its bindings.
    ///
    /// # Panics
    ///
    /// Panics if no frame is open.
    pub fn pop(&mut self, graph: &mut Graph) {
        let Some(frame) = self.frames.pop() else {
            panic!("pop of empty scope stack");
        };
        graph.pop_n(self.node, frame.len());
    }

    /// Bind `name` to `value` in the innermost frame.
    ///
    /// Shadowing a name from an outer frame is allowed; binding a name twice
    /// in one frame is not, and leaves the existing binding untouched.
    ///
    /// # Panics
    ///
    /// Panics if no frame is open.
    pub fn define(&mut self, graph: &mut Graph, name: &str, value: NodeId) -> Result<NodeId, ScopeError> {
        let slot = graph.inputs(self.node).len();
        let Some(frame) = self.frames.last_mut() else {
            panic!("define of `{}` with no open scope", name);
        };
        if frame.contains_key(name) {
            return Err(ScopeError::AlreadyDefined(Arc::from(name)));
        }
        frame.insert(Arc::from(name), slot);
        graph.add_def(self.node, Some(value));
        Ok(value)
    }

    /// Resolve `name`, innermost frame first.
    pub fn lookup(&self, graph: &Graph, name: &str) -> Option<NodeId> {
        let slot = self.slot(name)?;
        graph.input(self.node, slot)
    }

    /// Rebind `name` in the innermost frame that binds it, returning the
    /// previous value, or `None` if `name` is unbound.
    ///
    /// The previous value is retired if the binding was its last use; the
    /// returned id then refers to a dead node.
    pub fn update(&mut self, graph: &mut Graph, name: &str, value: NodeId) -> Option<NodeId> {
        let slot = self.slot(name)?;
        graph.set_def(self.node, slot, Some(value))
    }

    fn slot(&self, name: &str) -> Option<usize> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
    }

    /// Names bound in frame `depth` (0 = outermost), in definition order.
    pub fn names(&self, depth: usize) -> Vec<Arc<str>> {
        let Some(frame) = self.frames.get(depth) else {
            return Vec::new();
        };
        let mut bindings: Vec<(&Arc<str>, usize)> = frame.iter().map(|(n, &s)| (n, s)).collect();
        bindings.sort_by_key(|&(_, slot)| slot);
        bindings.into_iter().map(|(name, _)| name.clone()).collect()
    }

    /// Render every frame as `[name:value, ...]`, outermost first.
    pub fn print(&self, graph: &Graph) -> String {
        let mut out = String::new();
        for depth in 0..self.frames.len() {
            out.push('[');
            for (i, name) in self.names(depth).iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(name);
                out.push(':');
                match self.frames[depth].get(name).and_then(|&slot| graph.input(self.node, slot)) {
                    Some(value) => out.push_str(&graph.print(value)),
                    None => out.push_str("null"),
                }
            }
            out.push(']');
        }
        out
    }
}

// =============================================================================
// Tests
// =============================================================================
