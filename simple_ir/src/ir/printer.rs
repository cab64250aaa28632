//! Debug rendering of graphs.
//!
//! Two forms are provided:
//!
//! - [`Graph::print`]: a node as a source-like expression (`return (arg+1);`),
//!   expanded with an explicit work stack so deep chains cannot overflow
//! - [`GraphPrinter::render`]: one line per live node reachable from a root,
//!   in id order
//!
//! ```text
//! #0 Start in=[] out=[#2, #3] : [Ctrl, IntBot]
//! #2 Proj in=[#0] out=[#4] : Ctrl
//! ```

use std::fmt::{self, Write};

use super::graph::Graph;
use super::node::{NodeId, NodeKind};

impl Graph {
    /// Short label of a node's kind.
    pub fn label(&self, id: NodeId) -> &'static str {
        self.kind(id).name()
    }

    /// Render `id` as an expression.
    pub fn print(&self, id: NodeId) -> String {
        ExprDisplay { graph: self, id }.to_string()
    }
}

/// Pending output while flattening an expression.
enum Piece {
    Text(&'static str),
    Char(char),
    Input(Option<NodeId>),
}

/// Display adapter behind [`Graph::print`].
///
/// Walks inputs with an explicit stack, so unsimplified chains of any depth
/// print without growing the call stack.
struct ExprDisplay<'a> {
    graph: &'a Graph,
    id: NodeId,
}

impl ExprDisplay<'_> {
    /// Push the pieces of `id` so that they pop in print order.
    fn expand(&self, id: NodeId, stack: &mut Vec<Piece>) {
        let graph = self.graph;
        let input = |slot: usize| Piece::Input(graph.inputs(id).get(slot).copied().flatten());
        match graph.kind(id) {
            NodeKind::Return => stack.extend([Piece::Text(";"), input(1), Piece::Text("return ")]),
            NodeKind::Arith(op) => stack.extend([
                Piece::Char(')'),
                input(2),
                Piece::Char(op.symbol()),
                input(1),
                Piece::Char('('),
            ]),
            NodeKind::Minus => stack.extend([Piece::Char(')'), input(1), Piece::Text("(-")]),
            NodeKind::Scope => {
                stack.push(Piece::Char(']'));
                for slot in (0..graph.inputs(id).len()).rev() {
                    stack.push(input(slot));
                    if slot > 0 {
                        stack.push(Piece::Text(", "));
                    }
                }
                stack.push(Piece::Text("Scope["));
            }
            NodeKind::Start { .. } | NodeKind::Proj { .. } | NodeKind::Constant(_) => {}
        }
    }

    fn write_leaf(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        match self.graph.kind(id) {
            NodeKind::Start { .. } => f.write_str("Start"),
            NodeKind::Proj { label, .. } => f.write_str(label),
            NodeKind::Constant(ty) => write!(f, "{}", self.graph.types().display(*ty)),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Piece::Input(Some(self.id))];
        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Char(c) => f.write_char(c)?,
                Piece::Input(None) => f.write_str("null")?,
                Piece::Input(Some(id)) if self.graph.is_dead(id) => {
                    write!(f, "{}{}:DEAD", self.graph.label(id), id)?
                }
                Piece::Input(Some(id)) => {
                    self.write_leaf(f, id)?;
                    self.expand(id, &mut stack);
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Node Listing
// =============================================================================

/// Line-per-node listing of the live graph around a root.
pub struct GraphPrinter<'a> {
    graph: &'a Graph,
    root: NodeId,
}

impl<'a> GraphPrinter<'a> {
    pub fn new(graph: &'a Graph, root: NodeId) -> Self {
        GraphPrinter { graph, root }
    }

    /// List every live node reachable from `root` through inputs or outputs.
    pub fn render(graph: &Graph, root: NodeId) -> String {
        GraphPrinter::new(graph, root).to_string()
    }

    /// Live nodes connected to the root, sorted by id.
    fn reachable(&self) -> Vec<NodeId> {
        let graph = self.graph;
        let mut seen = vec![false; graph.len()];
        let mut found = Vec::new();
        let mut worklist = vec![self.root];
        while let Some(id) = worklist.pop() {
            if seen[id.as_usize()] || graph.is_dead(id) {
                continue;
            }
            seen[id.as_usize()] = true;
            found.push(id);
            worklist.extend(graph.inputs(id).iter().flatten().copied());
            worklist.extend(graph.outputs(id).iter().copied());
        }
        found.sort_unstable();
        found
    }

    fn write_line(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        let graph = self.graph;
        write!(f, "{} {} in=[", id, graph.label(id))?;
        for (i, input) in graph.inputs(id).iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match input {
                Some(def) => write!(f, "{}", def)?,
                None => f.write_char('_')?,
            }
        }
        f.write_str("] out=[")?;
        for (i, user) in graph.outputs(id).iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", user)?;
        }
        writeln!(f, "] : {}", graph.types().display(graph.ty(id)))
    }
}

impl fmt::Display for GraphPrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.reachable() {
            self.write_line(f, id)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
