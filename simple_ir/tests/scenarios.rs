//! End-to-end construction scenarios.

use simple_ir::{Graph, GraphBuilder, GraphConfig, GraphPrinter, NodeKind, ScopeError};

fn builder() -> GraphBuilder {
    GraphBuilder::new(GraphConfig::debug())
}

#[test]
fn return_constant_without_arguments() {
    let mut g = Graph::new(GraphConfig::debug());
    let start = g.start();
    let one = g.int(1);
    let ret = g.ret(start, one);

    assert_eq!(g.input(ret, 0), Some(start));
    assert_eq!(g.input(ret, 1), Some(one));
    assert_eq!(g.types().as_int(g.ty(one)), Some(1));
    assert!(g.node(one).is_constant());
    assert!(!g.live_nodes().any(|(_, n)| matches!(n.kind, NodeKind::Proj { .. })));
    assert_eq!(g.print(ret), "return 1;");
    assert!(g.verify().is_ok());
}

#[test]
fn constant_zero_is_shared() {
    let mut g = Graph::new(GraphConfig::debug());
    let start = g.start();
    let zero = g.int(0);
    g.ret(start, zero);
    let again = g.int(0);
    g.ret(start, again);

    assert_eq!(zero, again);
    assert_eq!(g.use_count(zero), 2);
    let zeros = g
        .live_nodes()
        .filter(|(_, n)| n.is_constant() && g.types().as_int(n.ty()) == Some(0))
        .count();
    assert_eq!(zeros, 1);
}

#[test]
fn inner_definition_shadows_outer() {
    let mut b = builder();
    let five = b.int(5);
    b.define("x", five).unwrap();

    b.push_scope();
    let six = b.int(6);
    b.define("x", six).unwrap();
    assert_eq!(b.lookup("x"), Some(six));

    b.pop_scope();
    assert_eq!(b.lookup("x"), Some(five));
    assert!(!b.graph().is_dead(six));
    assert_eq!(b.graph().use_count(six), 0);
}

#[test]
fn double_define_keeps_first_binding() {
    let mut b = builder();
    let one = b.int(1);
    let two = b.int(2);
    b.define("y", one).unwrap();

    let err = b.define("y", two).unwrap_err();
    assert_eq!(err, ScopeError::AlreadyDefined("y".into()));
    assert_eq!(err.to_string(), "`y` is already defined in this scope");
    assert_eq!(b.lookup("y"), Some(one));
}

#[test]
#[should_panic(expected = "tuple lane 2 out of range")]
fn projection_past_entry_arity_panics() {
    let mut g = Graph::with_signature(GraphConfig::debug(), |types| vec![types.ctrl()]);
    let start = g.start();
    g.new_proj(start, 2, "arg");
}

#[test]
fn arithmetic_folds_to_constant() {
    let mut b = builder();
    let one = b.int(1);
    let two = b.int(2);
    let three = b.int(3);
    let product = b.mul(two, three);
    let sum = b.add(one, product);
    let ret = b.ret(sum);

    let g = b.graph();
    assert!(g.node(sum).is_constant());
    assert_eq!(g.types().as_int(g.ty(sum)), Some(7));
    assert_eq!(g.print(ret), "return 7;");
    for operand in [one, two, three] {
        assert!(!g.is_dead(operand));
        assert_eq!(g.use_count(operand), 0);
    }
    assert!(!g.live_nodes().any(|(_, n)| matches!(n.kind, NodeKind::Arith(_))));
}

#[test]
fn repeated_literal_survives_folding() {
    let mut b = builder();
    let held = b.int(1);
    let one = b.int(1);
    let two = b.int(2);
    let inner = b.add(one, two);
    let sum = b.add(held, inner);
    let ret = b.ret(sum);

    let g = b.graph();
    assert_eq!(held, one);
    assert!(!g.is_dead(held));
    assert_eq!(g.types().as_int(g.ty(sum)), Some(4));
    assert_eq!(g.print(ret), "return 4;");
    assert!(g.verify().is_ok());
}

#[test]
fn literal_plus_its_negation_is_zero() {
    let mut b = builder();
    let five = b.int(5);
    let again = b.int(5);
    let neg = b.minus(again);
    let sum = b.add(five, neg);
    let ret = b.ret(sum);

    let g = b.graph();
    assert!(!g.is_dead(five));
    assert_eq!(g.types().as_int(g.ty(sum)), Some(0));
    assert_eq!(g.print(ret), "return 0;");
    assert!(g.verify().is_ok());
}

#[test]
fn adding_zero_returns_argument() {
    let mut b = builder();
    let arg = b.lookup("arg").unwrap();
    let zero = b.int(0);
    let sum = b.add(arg, zero);
    let ret = b.ret(sum);

    let g = b.graph();
    assert_eq!(sum, arg);
    assert!(matches!(g.kind(sum), NodeKind::Proj { lane: 1, .. }));
    assert_eq!(g.use_count(zero), 0);
    assert_eq!(g.print(ret), "return arg;");
}

#[test]
fn unoptimized_graph_keeps_every_node() {
    let mut b = GraphBuilder::new(GraphConfig::unoptimized());
    let arg = b.arg().unwrap();
    let zero = b.int(0);
    let sum = b.add(arg, zero);
    let ret = b.ret(sum);

    assert_eq!(b.graph().print(ret), "return (arg+0);");
    assert!(matches!(b.graph().kind(sum), NodeKind::Arith(_)));
}

#[test]
fn listing_covers_function_body() {
    let mut b = builder();
    let arg = b.arg().unwrap();
    let two = b.int(2);
    let product = b.mul(arg, two);
    let ret = b.ret(product);

    let listing = GraphPrinter::render(b.graph(), ret);
    // Start, $ctrl, arg, Scope, 2, Mul, Return
    assert_eq!(listing.lines().count(), 7);
    assert!(listing.lines().any(|l| l.starts_with(&format!("{} Mul", product))));
    assert!(listing.contains(": IntBot"));
}

#[test]
fn popping_releases_temporaries() {
    let mut b = builder();
    let before = b.graph().live_count();

    b.push_scope();
    let arg = b.arg().unwrap();
    let neg = b.minus(arg);
    b.define("t", neg).unwrap();
    let three = b.int(3);
    let sum = b.add(neg, three);
    b.define("u", sum).unwrap();
    assert_eq!(b.graph().live_count(), before + 3);

    b.pop_scope();
    // The literal 3 stays interned; the negation and the sum are gone.
    assert_eq!(b.graph().live_count(), before + 1);
    assert!(b.graph().is_dead(neg));
    assert!(b.graph().is_dead(sum));
    assert!(!b.graph().is_dead(three));
    assert!(b.graph().verify().is_ok());
}
