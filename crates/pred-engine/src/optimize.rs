//! Build-time optimization: static argument preparation, constant folding
//! and removal of nodes that are no longer reachable.

use std::collections::HashMap;

use log::{debug, trace};
use pred_types::{Value, ValueList};
use regex::Regex;

use crate::catalog::Catalog;
use crate::error::BuildError;
use crate::functions::Function;
use crate::node::{CallNode, NodeId, NodeKind, Prepared};
use crate::registry::Registry;
use crate::step::{ArgView, NodeState, step};

/// Rebuilds `source` bottom-up into a fresh registry, returning it with the
/// remapped roots.
pub(crate) fn optimize(
    source: &Registry,
    roots: &[NodeId],
    catalog: &Catalog,
) -> Result<(Registry, Vec<NodeId>), BuildError> {
    let mut optimizer = Optimizer {
        source,
        catalog,
        out: Registry::new(),
        memo: HashMap::new(),
        folded: 0,
    };
    let mut new_roots = roots
        .iter()
        .map(|root| optimizer.visit(*root))
        .collect::<Result<Vec<_>, _>>()?;
    let folded = optimizer.folded;
    let out = optimizer.out.compact(&mut new_roots);
    debug!(
        "optimized {} nodes into {} ({} folded)",
        source.len(),
        out.len(),
        folded
    );
    Ok((out, new_roots))
}

struct Optimizer<'a> {
    source: &'a Registry,
    catalog: &'a Catalog,
    out: Registry,
    memo: HashMap<NodeId, NodeId>,
    folded: usize,
}

impl<'a> Optimizer<'a> {
    fn visit(&mut self, id: NodeId) -> Result<NodeId, BuildError> {
        if let Some(done) = self.memo.get(&id) {
            return Ok(*done);
        }
        let source = self.source;
        let result = match source.node(id).kind() {
            NodeKind::Literal(literal) => self.out.intern_literal(literal.value.clone()),
            NodeKind::Var(var) => self.out.intern_var(&var.name, var.window),
            NodeKind::Call(call) => self.visit_call(call)?,
        };
        self.memo.insert(id, result);
        Ok(result)
    }

    fn visit_call(&mut self, call: &CallNode) -> Result<NodeId, BuildError> {
        use Function::*;
        let mut args = Vec::with_capacity(call.args.len());
        match call.function {
            And | AndSc | Or | OrSc => {
                // A static operand equal to the absorbing value decides the
                // call; the remaining operands are never visited.
                let absorbing = matches!(call.function, Or | OrSc);
                for arg in &call.args {
                    let new = self.visit(*arg)?;
                    if self.static_truth(new) == Some(absorbing) {
                        self.folded += 1;
                        return Ok(self.intern_bool(absorbing));
                    }
                    args.push(new);
                }
            }
            If => {
                let condition = self.visit(call.args[0])?;
                if let Some(truth) = self.static_truth(condition) {
                    self.folded += 1;
                    let branch = if truth { call.args[1] } else { call.args[2] };
                    return self.visit(branch);
                }
                args.push(condition);
                args.push(self.visit(call.args[1])?);
                args.push(self.visit(call.args[2])?);
            }
            _ => {
                for arg in &call.args {
                    args.push(self.visit(*arg)?);
                }
            }
        }

        let prepared = prepare(call.function, &args, &self.out, self.catalog)?;
        let all_static = args.iter().all(|arg| self.out.node(*arg).is_literal());
        if all_static && prepared.is_pure() {
            let candidate = CallNode {
                function: call.function,
                args,
                prepared,
            };
            if let Some(values) = self.fold(&candidate) {
                self.folded += 1;
                return Ok(self.out.intern_literal(values.into_literal()));
            }
            return Ok(self
                .out
                .intern_prepared(candidate.function, candidate.args, candidate.prepared));
        }
        Ok(self.out.intern_prepared(call.function, args, prepared))
    }

    /// Evaluates a call whose arguments are all literals.
    fn fold(&self, call: &CallNode) -> Option<ValueList> {
        let views: Vec<ArgView<'_>> = call
            .args
            .iter()
            .map(|arg| {
                let literal = self
                    .out
                    .node(*arg)
                    .as_literal()
                    .unwrap_or_else(|| panic!("folding {} over non-literal {arg}", call.function));
                ArgView {
                    values: &literal.list,
                    finished: true,
                }
            })
            .collect();
        let mut state = NodeState::default();
        step(call, &views, &mut state);
        if !state.finished || !state.values.iter().all(Value::is_finite) {
            return None;
        }
        trace!("folded {} to {} values", call.function, state.values.len());
        Some(state.values)
    }

    fn static_truth(&self, id: NodeId) -> Option<bool> {
        self.out
            .node(id)
            .as_literal()
            .map(|literal| literal.list.is_truthy())
    }

    fn intern_bool(&mut self, truth: bool) -> NodeId {
        let values = if truth {
            ValueList::truthy()
        } else {
            ValueList::new()
        };
        self.out.intern_literal(values.into_literal())
    }
}

/// Checks the static arguments of `function` and compiles whatever can be
/// compiled once per node.
fn prepare(
    function: Function,
    args: &[NodeId],
    reg: &Registry,
    catalog: &Catalog,
) -> Result<Prepared, BuildError> {
    use Function::*;
    match function {
        Eq | Ne => {
            let value = static_arg(function, args, reg, 0)?;
            if value.as_list().is_some() {
                return Err(type_error(function, 0, "scalar", value.kind()));
            }
            Ok(Prepared::None)
        }
        Lt | Le | Gt | Ge => {
            let value = static_arg(function, args, reg, 0)?;
            if value.as_f64().is_none() {
                return Err(type_error(function, 0, "number", value.kind()));
            }
            Ok(Prepared::None)
        }
        Named | NamedI | SetName => {
            static_text(function, args, reg, 0)?;
            Ok(Prepared::None)
        }
        NamedRx => {
            let pattern = static_text(function, args, reg, 0)?;
            let regex = Regex::new(&pattern).map_err(|err| BuildError::InvalidArgument {
                function: function.to_string(),
                message: err.to_string(),
            })?;
            Ok(Prepared::Regex(regex))
        }
        Nth | IsLonger => {
            let value = static_arg(function, args, reg, 0)?;
            let n = value
                .as_number()
                .ok_or_else(|| type_error(function, 0, "integer", value.kind()))?;
            let min = if function == Nth { 1 } else { 0 };
            if n < min {
                return Err(BuildError::InvalidArgument {
                    function: function.to_string(),
                    message: format!("expected an integer >= {min}, got {n}"),
                });
            }
            Ok(Prepared::None)
        }
        Operator => {
            let name = static_text(function, args, reg, 0)?;
            let argument = static_arg(function, args, reg, 1)?;
            let operator = catalog
                .operator(&name)
                .ok_or_else(|| BuildError::UnknownFunction(name.clone()))?;
            let instance =
                operator
                    .instantiate(argument)
                    .map_err(|err| BuildError::InvalidArgument {
                        function: name.clone(),
                        message: err.to_string(),
                    })?;
            Ok(Prepared::Operator {
                pure: operator.is_pure(),
                name,
                instance,
            })
        }
        Transformation => {
            let name = static_text(function, args, reg, 0)?;
            let transformation = catalog
                .transformation(&name)
                .ok_or_else(|| BuildError::UnknownFunction(name.clone()))?;
            Ok(Prepared::Transformation {
                pure: transformation.is_pure(),
                name,
                transformation: transformation.clone(),
            })
        }
        And | Or | AndSc | OrSc | Not | If | True | False | Cat | First | Rest | Scatter
        | Gather => Ok(Prepared::None),
    }
}

fn type_error(function: Function, index: usize, expected: &'static str, actual: &str) -> BuildError {
    BuildError::Type {
        function: function.to_string(),
        index,
        expected,
        actual: actual.to_string(),
    }
}

/// The single value held by a static argument.
fn static_arg<'r>(
    function: Function,
    args: &[NodeId],
    reg: &'r Registry,
    index: usize,
) -> Result<&'r Value, BuildError> {
    let node = reg.node(args[index]);
    match node.kind() {
        NodeKind::Literal(literal) => match literal.list.as_slice() {
            [value] => Ok(value),
            values => Err(type_error(
                function,
                index,
                "single literal value",
                &format!("{} values", values.len()),
            )),
        },
        NodeKind::Var(var) => Err(type_error(
            function,
            index,
            "literal",
            &format!("var {}", var.name),
        )),
        NodeKind::Call(call) => Err(type_error(
            function,
            index,
            "literal",
            &format!("call {}", call.function),
        )),
    }
}

fn static_text(
    function: Function,
    args: &[NodeId],
    reg: &Registry,
    index: usize,
) -> Result<String, BuildError> {
    let value = static_arg(function, args, reg, index)?;
    let bytes = value
        .as_bytes()
        .ok_or_else(|| type_error(function, index, "string", value.kind()))?;
    String::from_utf8(bytes.to_vec()).map_err(|_| type_error(function, index, "utf-8 string", "bytes"))
}
