use petgraph::{algo::is_cyclic_directed, graphmap::DiGraphMap};

use crate::environment::Environment;
use crate::error::BuildError;
use crate::functions::Function;
use crate::node::{CallNode, NodeKind, Prepared};
use crate::registry::Registry;

/// Post-optimization checks on the graph about to be sealed.
pub(crate) fn validate(reg: &Registry, env: &Environment) -> Result<(), BuildError> {
    let mut graph = DiGraphMap::<usize, ()>::new();
    for id in reg.ids() {
        graph.add_node(id.index());
        for child in reg.node(id).children() {
            graph.add_edge(id.index(), child.index(), ());
        }
    }
    if is_cyclic_directed(&graph) {
        return Err(BuildError::CyclicReference);
    }

    for id in reg.ids() {
        match reg.node(id).kind() {
            NodeKind::Var(var) if !env.contains(&var.name) => {
                return Err(BuildError::UnknownVar(var.name.clone()));
            }
            NodeKind::Call(call) => {
                call.function.check_arity(call.args.len())?;
                validate_call(reg, call)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_call(reg: &Registry, call: &CallNode) -> Result<(), BuildError> {
    for (index, arg) in call.args.iter().enumerate() {
        if call.function.is_static_arg(index) && !reg.node(*arg).is_literal() {
            return Err(BuildError::Type {
                function: call.function.to_string(),
                index,
                expected: "literal",
                actual: reg.node(*arg).label(),
            });
        }
    }
    let prepared = match (call.function, &call.prepared) {
        (Function::NamedRx, Prepared::Regex(_)) => true,
        (Function::Operator, Prepared::Operator { .. }) => true,
        (Function::Transformation, Prepared::Transformation { .. }) => true,
        (Function::NamedRx | Function::Operator | Function::Transformation, _) => false,
        (_, prepared) => matches!(prepared, Prepared::None),
    };
    if prepared {
        Ok(())
    } else {
        Err(BuildError::InvalidArgument {
            function: call.function.to_string(),
            message: format!("inconsistent prepared state {:?}", call.prepared),
        })
    }
}
