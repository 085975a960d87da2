#[path = "helpers.rs"]
mod helpers;

use helpers::{build_all, build_one, call, var};
use pred_engine::{EvalError, MemoryVarSource, VarSource};
use pred_types::{Expr, Phase, Value, ValueList};

#[test]
fn long_uri_check_stays_false_and_finishes_with_the_request_line() {
    let expr = call("gt", [Expr::lit(Value::number(1000)), call("length", [var("REQUEST_URI")])]);
    let (dag, root) = build_one(&expr);
    assert_eq!(
        dag.to_s(root),
        "(gt 1000 (transformation 'length' (var 'REQUEST_URI' 'REQUEST_LINE' 'REQUEST_LINE')))"
    );

    let mut source = MemoryVarSource::new();
    source.push("REQUEST_URI", "/abcd");
    let mut ctx = dag.new_context();
    let report = ctx.advance_phase(Phase::RequestLine, &source).unwrap();
    assert!(report.ready.is_empty());
    assert_eq!(report.finished.len(), 1);
    let view = ctx.query(root);
    assert!(view.finished);
    assert!(view.values.is_falsy());
}

#[test]
fn long_uri_check_is_open_until_the_var_finishes() {
    let expr = call(
        "gt",
        [
            Expr::lit(Value::number(1000)),
            call(
                "length",
                [Expr::var_in(
                    "REQUEST_URI",
                    helpers::window(Phase::RequestLine, Phase::RequestHeader),
                )],
            ),
        ],
    );
    let (dag, root) = build_one(&expr);
    let mut source = MemoryVarSource::new();
    source.push("REQUEST_URI", "/abcd");
    let mut ctx = dag.new_context();
    ctx.advance_phase(Phase::RequestLine, &source).unwrap();
    assert!(!ctx.is_finished(root));
    assert!(!ctx.is_ready(root));
    source.finish("REQUEST_URI");
    ctx.advance_phase(Phase::RequestHeader, &source).unwrap();
    assert!(ctx.is_finished(root));
    assert!(!ctx.is_ready(root));
}

fn no_foo_in_args() -> Expr {
    call("not", [call("rx", [Expr::lit("foo"), var("ARGS")])])
}

#[test]
fn negated_match_finishes_false_as_soon_as_args_match() {
    let (dag, root) = build_one(&no_foo_in_args());
    let mut source = MemoryVarSource::new();
    let mut ctx = dag.new_context();

    ctx.advance_phase(Phase::RequestLine, &source).unwrap();
    assert!(!ctx.is_finished(root));

    source.push("ARGS", Value::string("a=1").with_name("a"));
    let report = ctx.advance_phase(Phase::RequestHeader, &source).unwrap();
    assert!(report.ready.is_empty());
    assert!(!ctx.is_finished(root));
    assert!(!ctx.is_ready(root));

    source.push("ARGS", Value::string("q=xfoox").with_name("q"));
    let report = ctx.advance_phase(Phase::RequestBody, &source).unwrap();
    assert!(report.ready.is_empty());
    assert_eq!(report.finished.len(), 1);
    assert!(ctx.is_finished(root));
    assert!(!ctx.is_ready(root));

    // Later phases change nothing.
    let report = ctx.advance_phase(Phase::Logging, &source).unwrap();
    assert!(report.ready.is_empty() && report.finished.is_empty());
    assert_eq!(report.evaluated, 0);
}

#[test]
fn negated_match_finishes_true_when_args_close_clean() {
    let (dag, root) = build_one(&no_foo_in_args());
    let mut source = MemoryVarSource::new();
    let mut ctx = dag.new_context();

    source.push("ARGS", "a=1");
    ctx.advance_phase(Phase::RequestHeader, &source).unwrap();
    assert!(!ctx.is_ready(root));

    source.push("ARGS", "b=bar");
    let report = ctx.advance_phase(Phase::RequestBody, &source).unwrap();
    assert_eq!(report.ready.len(), 1);
    assert_eq!(report.finished.len(), 1);
    let view = ctx.query(root);
    assert!(view.finished);
    assert_eq!(view.values, &ValueList::truthy());
}

#[test]
fn literal_concatenation_folds_at_build_time() {
    let expr = call(
        "cat",
        [
            call("set_name", [Expr::lit("a"), Expr::lit(Value::number(1))]),
            call("set_name", [Expr::lit("b"), Expr::lit(Value::number(2))]),
        ],
    );
    let (dag, root) = build_one(&expr);
    assert_eq!(dag.len(), 1);
    let literal = dag.node(root).as_literal().expect("folded to literal");
    assert_eq!(
        literal.list,
        ValueList::from(vec![
            Value::number(1).with_name("a"),
            Value::number(2).with_name("b"),
        ])
    );
    assert_eq!(dag.to_s(root), "['a':1 'b':2]");

    let ctx = dag.new_context();
    assert!(ctx.is_finished(root));
    assert!(ctx.is_ready(root));
}

#[test]
fn transactions_do_not_share_state() {
    let (dag, root) = build_one(&no_foo_in_args());

    let mut hit = MemoryVarSource::new();
    hit.push("ARGS", "foo").finish("ARGS");
    let mut clean = MemoryVarSource::new();
    clean.push("ARGS", "bar").finish("ARGS");

    let mut first = dag.new_context();
    let mut second = dag.new_context();
    first.advance_phase(Phase::RequestHeader, &hit).unwrap();
    assert!(first.is_finished(root) && !first.is_ready(root));
    assert!(!second.is_finished(root));

    second.advance_phase(Phase::RequestHeader, &clean).unwrap();
    assert!(second.is_finished(root) && second.is_ready(root));
    assert!(!first.is_ready(root));

    // A fresh context starts empty.
    let third = dag.new_context();
    assert!(third.query(root).values.is_empty());
    assert_eq!(third.phase(), None);
}

#[test]
fn phases_must_strictly_increase() {
    let (dag, _) = build_one(&no_foo_in_args());
    let source = MemoryVarSource::new();
    let mut ctx = dag.new_context();
    ctx.advance_phase(Phase::RequestBody, &source).unwrap();
    assert_eq!(
        ctx.advance_phase(Phase::RequestBody, &source),
        Err(EvalError::PhaseOrder {
            previous: Phase::RequestBody,
            next: Phase::RequestBody,
        })
    );
    assert!(ctx.advance_phase(Phase::RequestLine, &source).is_err());
}

#[test]
fn skipped_window_is_caught_up_at_the_next_phase() {
    let (dag, root) = build_one(&call("first", [var("REQUEST_HEADERS")]));
    let mut source = MemoryVarSource::new();
    source.push("REQUEST_HEADERS", "host");
    let mut ctx = dag.new_context();
    ctx.advance_phase(Phase::RequestBody, &source).unwrap();
    assert!(ctx.is_finished(root));
    assert_eq!(ctx.query(root).values.first(), Some(&Value::string("host")));
}

#[test]
#[should_panic(expected = "shrank")]
fn shrinking_source_is_fatal() {
    struct Flaky(Vec<Value>);
    impl VarSource for Flaky {
        fn values(&self, _: &str) -> &[Value] {
            &self.0
        }
        fn is_finished(&self, _: &str) -> bool {
            false
        }
    }

    let (dag, _) = build_one(&no_foo_in_args());
    let mut ctx = dag.new_context();
    ctx.advance_phase(Phase::RequestHeader, &Flaky(vec![Value::string("a"), Value::string("b")]))
        .unwrap();
    let _ = ctx.advance_phase(Phase::RequestBody, &Flaky(vec![Value::string("a")]));
}

#[test]
#[should_panic(expected = "after it finished")]
fn append_after_source_finished_is_fatal() {
    let expr = call(
        "first",
        [Expr::var_in(
            "ARGS",
            helpers::window(Phase::RequestHeader, Phase::Logging),
        )],
    );
    let (dag, _) = build_one(&expr);
    let mut ctx = dag.new_context();

    let mut closed = MemoryVarSource::new();
    closed.finish("ARGS");
    ctx.advance_phase(Phase::RequestHeader, &closed).unwrap();

    let mut late = MemoryVarSource::new();
    late.push("ARGS", "late").finish("ARGS");
    let _ = ctx.advance_phase(Phase::RequestBody, &late);
}

#[test]
#[should_panic(expected = "rewrote earlier values")]
fn rewritten_source_prefix_is_fatal() {
    let (dag, _) = build_one(&no_foo_in_args());
    let mut ctx = dag.new_context();
    let mut source = MemoryVarSource::new();
    source.push("ARGS", "a=1");
    ctx.advance_phase(Phase::RequestHeader, &source).unwrap();

    let mut rewritten = MemoryVarSource::new();
    rewritten.push("ARGS", "b=2").push("ARGS", "c=3");
    let _ = ctx.advance_phase(Phase::RequestBody, &rewritten);
}

#[test]
fn window_closed_var_ignores_later_source_values() {
    let (dag, root) = build_one(&call("first", [var("REQUEST_URI")]));
    let mut source = MemoryVarSource::new();
    source.push("REQUEST_URI", "/a");
    let mut ctx = dag.new_context();
    ctx.advance_phase(Phase::RequestLine, &source).unwrap();
    source.push("REQUEST_URI", "/b");
    ctx.advance_phase(Phase::RequestHeader, &source).unwrap();
    assert_eq!(ctx.query(root).values.as_slice(), &[Value::string("/a")]);
}

#[test]
fn folded_literal_root_is_reported_by_the_first_phase_only() {
    let dag = build_all(&[call("true", []), call("first", [var("ARGS")])]);
    let mut source = MemoryVarSource::new();
    let mut ctx = dag.new_context();
    assert!(ctx.is_ready(dag.roots()[0]));

    let report = ctx.advance_phase(Phase::RequestLine, &source).unwrap();
    let ready: Vec<usize> = report.ready.iter().map(|root| root.index()).collect();
    let finished: Vec<usize> = report.finished.iter().map(|root| root.index()).collect();
    assert_eq!(ready, vec![0]);
    assert_eq!(finished, vec![0]);

    source.push("ARGS", "x").finish("ARGS");
    let report = ctx.advance_phase(Phase::RequestHeader, &source).unwrap();
    let ready: Vec<usize> = report.ready.iter().map(|root| root.index()).collect();
    assert_eq!(ready, vec![1]);
    assert_eq!(report.finished.len(), 1);
}
