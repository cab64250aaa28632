use proptest::prelude::*;
use simple_ir::{ArithOp, GraphBuilder, GraphConfig, IntType, NodeKind, NodeState, Ty, Type, TypeTable};

// =============================================================================
// Lattice
// =============================================================================

/// Lattice values described independently of any table.
#[derive(Debug, Clone)]
enum Shape {
    Top,
    Bottom,
    Ctrl,
    Int(IntType),
    Tuple(Vec<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        Just(Shape::Top),
        Just(Shape::Bottom),
        Just(Shape::Ctrl),
        Just(Shape::Int(IntType::Top)),
        Just(Shape::Int(IntType::Bot)),
        (-3i64..3).prop_map(|v| Shape::Int(IntType::Const(v))),
    ];
    leaf.prop_recursive(3, 12, 3, |inner| {
        prop::collection::vec(inner, 0..3).prop_map(Shape::Tuple)
    })
}

fn intern(types: &mut TypeTable, shape: &Shape) -> Ty {
    match shape {
        Shape::Top => types.top(),
        Shape::Bottom => types.bottom(),
        Shape::Ctrl => types.ctrl(),
        Shape::Int(int) => types.intern(Type::Int(*int)),
        Shape::Tuple(components) => {
            let components = components.iter().map(|c| intern(types, c)).collect();
            types.tuple(components)
        }
    }
}

proptest! {
    #[test]
    fn meet_is_commutative(a in shape(), b in shape()) {
        let mut types = TypeTable::new();
        let (a, b) = (intern(&mut types, &a), intern(&mut types, &b));
        prop_assert_eq!(types.meet(a, b), types.meet(b, a));
    }

    #[test]
    fn meet_is_idempotent(a in shape()) {
        let mut types = TypeTable::new();
        let a = intern(&mut types, &a);
        prop_assert_eq!(types.meet(a, a), a);
    }

    #[test]
    fn meet_is_associative(a in shape(), b in shape(), c in shape()) {
        let mut types = TypeTable::new();
        let (a, b, c) = (
            intern(&mut types, &a),
            intern(&mut types, &b),
            intern(&mut types, &c),
        );
        let ab = types.meet(a, b);
        let bc = types.meet(b, c);
        prop_assert_eq!(types.meet(ab, c), types.meet(a, bc));
    }

    #[test]
    fn top_is_identity_and_bottom_absorbs(a in shape()) {
        let mut types = TypeTable::new();
        let a = intern(&mut types, &a);
        let (top, bottom) = (types.top(), types.bottom());
        prop_assert_eq!(types.meet(top, a), a);
        prop_assert_eq!(types.meet(bottom, a), bottom);
    }

    #[test]
    fn meet_moves_down(a in shape(), b in shape()) {
        let mut types = TypeTable::new();
        let (a, b) = (intern(&mut types, &a), intern(&mut types, &b));
        let m = types.meet(a, b);
        prop_assert!(types.is_at_or_below(a, m));
        prop_assert!(types.is_at_or_below(b, m));
    }
}

// =============================================================================
// Construction
// =============================================================================

/// One step of a random function body.
#[derive(Debug, Clone)]
enum Step {
    Literal(i64),
    Binary(ArithOp, usize, usize),
    Negate(usize),
    /// `v op (v op w)` with the outer `v` requested before the inner fold.
    Refold(ArithOp, i64, i64),
    /// `v + -v` with both literals requested separately.
    Cancel(i64),
    Assign(usize, usize),
    Push,
    Pop,
}

fn arith_op() -> impl Strategy<Value = ArithOp> {
    prop_oneof![
        Just(ArithOp::Add),
        Just(ArithOp::Sub),
        Just(ArithOp::Mul),
        Just(ArithOp::Div),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (-2i64..3).prop_map(Step::Literal),
        4 => (arith_op(), any::<usize>(), any::<usize>()).prop_map(|(op, l, r)| Step::Binary(op, l, r)),
        1 => (arith_op(), -2i64..3, -2i64..3).prop_map(|(op, v, w)| Step::Refold(op, v, w)),
        1 => (-2i64..3).prop_map(Step::Cancel),
        2 => any::<usize>().prop_map(Step::Negate),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(l, r)| Step::Assign(l, r)),
        1 => Just(Step::Push),
        1 => Just(Step::Pop),
    ]
}

/// Replays steps, naming every value so it stays reachable through the scope.
struct Session {
    builder: GraphBuilder,
    names: Vec<String>,
    frames: Vec<usize>,
}

impl Session {
    fn new() -> Self {
        Session {
            builder: GraphBuilder::new(GraphConfig::debug()),
            names: vec!["arg".to_string()],
            frames: Vec::new(),
        }
    }

    fn pick(&self, index: usize) -> simple_ir::NodeId {
        let name = &self.names[index % self.names.len()];
        self.builder.lookup(name).expect("named value is bound")
    }

    fn bind(&mut self, value: simple_ir::NodeId) {
        let name = format!("v{}", self.names.len());
        self.builder.define(&name, value).expect("fresh name");
        self.names.push(name);
    }

    fn apply(&mut self, step: &Step) {
        match *step {
            Step::Literal(v) => {
                let node = self.builder.int(v);
                self.bind(node);
            }
            Step::Binary(op, l, r) => {
                let (lhs, rhs) = (self.pick(l), self.pick(r));
                let node = self.builder.graph_mut().arith(op, lhs, rhs);
                self.bind(node);
            }
            Step::Negate(i) => {
                let value = self.pick(i);
                let node = self.builder.minus(value);
                self.bind(node);
            }
            Step::Refold(op, v, w) => {
                let held = self.builder.int(v);
                let (a, b) = (self.builder.int(v), self.builder.int(w));
                let graph = self.builder.graph_mut();
                let inner = graph.arith(op, a, b);
                let node = graph.arith(op, held, inner);
                self.bind(node);
            }
            Step::Cancel(v) => {
                let held = self.builder.int(v);
                let again = self.builder.int(v);
                let neg = self.builder.minus(again);
                let node = self.builder.add(held, neg);
                self.bind(node);
            }
            Step::Assign(l, r) => {
                let value = self.pick(r);
                let name = self.names[l % self.names.len()].clone();
                self.builder.update(&name, value);
            }
            Step::Push => {
                self.builder.push_scope();
                self.frames.push(self.names.len());
            }
            Step::Pop => {
                if let Some(mark) = self.frames.pop() {
                    self.builder.pop_scope();
                    self.names.truncate(mark);
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn edges_stay_symmetric(steps in prop::collection::vec(step(), 1..40)) {
        let mut session = Session::new();
        for step in &steps {
            session.apply(step);
            prop_assert_eq!(session.builder.graph().verify(), Ok(()));
        }
    }

    #[test]
    fn live_nodes_are_at_fixpoint(steps in prop::collection::vec(step(), 1..40)) {
        let mut session = Session::new();
        for step in &steps {
            session.apply(step);
        }

        let graph = session.builder.graph();
        for (id, node) in graph.live_nodes() {
            prop_assert_eq!(node.state(), NodeState::Simplified);
            prop_assert_eq!(graph.idealize(id), None);
            if !matches!(node.kind, NodeKind::Constant(_)) {
                prop_assert!(!graph.types().is_constant(node.ty()), "{} kept a constant type", id);
            }
        }
    }

    #[test]
    fn scope_keeps_every_binding_alive(steps in prop::collection::vec(step(), 1..40)) {
        let mut session = Session::new();
        for step in &steps {
            session.apply(step);
        }
        for name in &session.names {
            let value = session.builder.lookup(name);
            prop_assert!(value.is_some());
            prop_assert!(!session.builder.graph().is_dead(value.unwrap()));
        }
    }
}
