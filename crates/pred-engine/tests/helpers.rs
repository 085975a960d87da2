#![allow(dead_code)]

use pred_engine::{Builder, Catalog, Dag, Environment, NodeId};
use pred_types::{Expr, Phase, PhaseWindow, Template};

pub fn window(first: Phase, last: Phase) -> PhaseWindow {
    PhaseWindow::new(first, last).expect("ordered window")
}

/// Vars used across the suites, with the windows a typical host declares.
pub fn env() -> Environment {
    let mut env = Environment::new();
    env.declare("REQUEST_URI", Some(PhaseWindow::single(Phase::RequestLine)))
        .declare("ARGS", Some(window(Phase::RequestHeader, Phase::RequestBody)))
        .declare("REQUEST_HEADERS", Some(PhaseWindow::single(Phase::RequestHeader)))
        .declare("RESPONSE_STATUS", Some(PhaseWindow::single(Phase::ResponseLine)))
        .declare("UNWINDOWED", None);
    env
}

pub fn build_all(exprs: &[Expr]) -> Dag {
    pred_engine::build(exprs, Vec::<Template>::new(), &env(), &Catalog::with_standard()).expect("build")
}

/// Builds `expr` as the only root and returns the DAG with the root node.
pub fn build_one(expr: &Expr) -> (Dag, NodeId) {
    let env = env();
    let catalog = Catalog::with_standard();
    let mut builder = Builder::new(&env, &catalog);
    let root = builder.add_root(expr).expect("add root");
    let dag = builder.finish().expect("finish");
    let node = dag.root(root);
    (dag, node)
}

pub fn var(name: &str) -> Expr {
    Expr::var(name)
}

pub fn call<const N: usize>(name: &str, args: [Expr; N]) -> Expr {
    Expr::call(name, args)
}
