//! Incremental semantics of every built-in function.
//!
//! `step` is called with the current view of each child and updates the
//! call's own state. It only ever appends, and it may run any number of
//! times against growing child views; child views that lag behind their
//! true state only delay the result, they never make it wrong.

use log::warn;
use pred_types::{Value, ValueData, ValueList};

use crate::functions::Function;
use crate::node::{CallNode, Prepared};

/// Current state of one child as seen by its parent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArgView<'a> {
    pub values: &'a ValueList,
    pub finished: bool,
}

impl ArgView<'_> {
    fn is_decided_false(&self) -> bool {
        self.finished && self.values.is_falsy()
    }
}

/// Per-transaction state of a call or var node.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeState {
    pub values: ValueList,
    pub finished: bool,
    /// Elements of the streamed child already consumed.
    cursor: usize,
    /// Child currently streamed by `cat`.
    child: usize,
    /// Branch argument index selected by `if`.
    branch: Option<usize>,
}

impl NodeState {
    pub fn append(&mut self, value: Value) {
        assert!(
            !self.finished,
            "append of {value} to a finished value list"
        );
        self.values.push(value);
    }

    /// Appends the elements of `source` not seen yet.
    pub fn extend_new(&mut self, source: &ValueList) {
        self.assert_not_shrunk(source);
        for value in &source.as_slice()[self.cursor..] {
            self.append(value.clone());
        }
        self.cursor = source.len();
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    fn set_true(&mut self) {
        if self.values.is_falsy() {
            self.append(Value::string(""));
        }
        self.finish();
    }

    fn assert_not_shrunk(&self, source: &ValueList) {
        assert!(
            source.len() >= self.cursor,
            "child value list shrank from {} to {} elements",
            self.cursor,
            source.len()
        );
    }

    /// Elements of `source` past the cursor; advances the cursor.
    fn take_new<'v>(&mut self, source: &'v ValueList) -> &'v [Value] {
        self.assert_not_shrunk(source);
        let new = &source.as_slice()[self.cursor..];
        self.cursor = source.len();
        new
    }
}

/// Advances `state` for `call` given its children.
pub(crate) fn step(call: &CallNode, args: &[ArgView<'_>], state: &mut NodeState) {
    use Function::*;
    if state.finished {
        return;
    }
    match call.function {
        And | AndSc => {
            if args.iter().any(ArgView::is_decided_false) {
                state.finish();
            } else if args.iter().all(|arg| arg.values.is_truthy()) {
                state.set_true();
            }
        }
        Or | OrSc => {
            if args.iter().any(|arg| arg.values.is_truthy()) {
                state.set_true();
            } else if args.iter().all(ArgView::is_decided_false) {
                state.finish();
            }
        }
        Not => {
            let child = &args[0];
            if child.values.is_truthy() {
                state.finish();
            } else if child.finished {
                state.set_true();
            }
        }
        If => {
            if state.branch.is_none() {
                state.branch = select_branch(&args[0]);
            }
            if let Some(branch) = state.branch {
                let chosen = &args[branch];
                state.extend_new(chosen.values);
                if chosen.finished {
                    state.finish();
                }
            }
        }
        True => state.set_true(),
        False => state.finish(),
        Eq | Ne | Lt | Le | Gt | Ge | Named | NamedI | NamedRx => {
            let operand = static_value(args, 0);
            let input = &args[1];
            for value in state.take_new(input.values) {
                if filter_accepts(call, operand, value) {
                    state.append(value.clone());
                }
            }
            if input.finished {
                state.finish();
            }
        }
        Cat => {
            while state.child < args.len() {
                let child = &args[state.child];
                state.extend_new(child.values);
                if !child.finished {
                    break;
                }
                state.child += 1;
                state.cursor = 0;
            }
            if state.child == args.len() {
                state.finish();
            }
        }
        First => emit_nth(state, &args[0], 0),
        Nth => {
            let n = static_number(args, 0);
            let index = usize::try_from(n.saturating_sub(1)).unwrap_or(usize::MAX);
            emit_nth(state, &args[1], index);
        }
        Rest => {
            let input = &args[0];
            if state.cursor == 0 && !input.values.is_empty() {
                state.cursor = 1;
            }
            if state.cursor > 0 {
                state.extend_new(input.values);
            }
            if input.finished {
                state.finish();
            }
        }
        SetName => {
            let name = String::from_utf8_lossy(static_bytes(args, 0)).into_owned();
            let input = &args[1];
            for value in state.take_new(input.values) {
                state.append(value.with_name(name.as_str()));
            }
            if input.finished {
                state.finish();
            }
        }
        Scatter => {
            let input = &args[0];
            for value in state.take_new(input.values) {
                match value.data() {
                    ValueData::List(items) => {
                        for item in items {
                            state.append(item.clone());
                        }
                    }
                    _ => state.append(value.clone()),
                }
            }
            if input.finished {
                state.finish();
            }
        }
        Gather => {
            let input = &args[0];
            if input.finished {
                state.append(Value::list(input.values.iter().cloned()));
                state.finish();
            }
        }
        IsLonger => {
            let n = static_number(args, 0);
            let input = &args[1];
            let longer = i64::try_from(input.values.len()).map_or(true, |len| len > n);
            if longer {
                state.set_true();
            } else if input.finished {
                state.finish();
            }
        }
        Operator => run_operator(call, &args[2], state),
        Transformation => run_transformation(call, &args[1], state),
    }
}

fn select_branch(condition: &ArgView<'_>) -> Option<usize> {
    if condition.values.is_truthy() {
        Some(1)
    } else if condition.finished {
        Some(2)
    } else {
        None
    }
}

fn emit_nth(state: &mut NodeState, input: &ArgView<'_>, index: usize) {
    if let Some(value) = input.values.get(index) {
        state.append(value.clone());
        state.finish();
    } else if input.finished {
        state.finish();
    }
}

fn static_value<'a>(args: &[ArgView<'a>], index: usize) -> &'a Value {
    args[index]
        .values
        .first()
        .unwrap_or_else(|| panic!("static argument {index} is empty"))
}

fn static_number(args: &[ArgView<'_>], index: usize) -> i64 {
    let value = static_value(args, index);
    value
        .as_number()
        .unwrap_or_else(|| panic!("static argument {index} is {}, not a number", value.kind()))
}

fn static_bytes<'a>(args: &[ArgView<'a>], index: usize) -> &'a [u8] {
    let value = static_value(args, index);
    value
        .as_bytes()
        .unwrap_or_else(|| panic!("static argument {index} is {}, not a string", value.kind()))
}

fn filter_accepts(call: &CallNode, operand: &Value, value: &Value) -> bool {
    use std::cmp::Ordering;
    use Function::*;
    match call.function {
        Named => operand.as_bytes() == Some(value.name().as_bytes()),
        NamedI => operand
            .as_bytes()
            .is_some_and(|name| name.eq_ignore_ascii_case(value.name().as_bytes())),
        NamedRx => match &call.prepared {
            Prepared::Regex(regex) => regex.is_match(value.name()),
            other => panic!("named_rx without compiled regex: {other:?}"),
        },
        Eq => scalar_eq(value, operand),
        Ne => !scalar_eq(value, operand),
        Lt | Le | Gt | Ge => {
            let (Some(lhs), Some(rhs)) = (value.as_f64(), operand.as_f64()) else {
                return false;
            };
            let Some(ordering) = lhs.partial_cmp(&rhs) else {
                return false;
            };
            match call.function {
                Lt => ordering == Ordering::Less,
                Le => ordering != Ordering::Greater,
                Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }
        }
        other => unreachable!("{other} is not a filter"),
    }
}

/// Payload equality ignoring names; numbers and floats compare numerically.
fn scalar_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs.data(), rhs.data()) {
        (ValueData::String(a), ValueData::String(b)) => a == b,
        (ValueData::Number(a), ValueData::Number(b)) => a == b,
        (ValueData::List(_), _) | (_, ValueData::List(_)) => false,
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn run_operator(call: &CallNode, input: &ArgView<'_>, state: &mut NodeState) {
    let Prepared::Operator { name, instance, .. } = &call.prepared else {
        panic!("operator call without instance: {:?}", call.prepared);
    };
    for value in state.take_new(input.values) {
        match instance.execute(value) {
            Ok(result) if result.matched => {
                let out = match result.capture {
                    Some(capture) => Value::new(value.name(), ValueData::List(capture)),
                    None => value.clone(),
                };
                state.append(out);
            }
            Ok(_) => {}
            Err(err) => warn!("operator '{name}' failed on {value}: {err}"),
        }
    }
    if input.finished {
        state.finish();
    }
}

fn run_transformation(call: &CallNode, input: &ArgView<'_>, state: &mut NodeState) {
    let Prepared::Transformation {
        name,
        transformation,
        ..
    } = &call.prepared
    else {
        panic!("transformation call without implementation: {:?}", call.prepared);
    };
    for value in state.take_new(input.values) {
        match transformation.transform(value) {
            Ok(out) => state.append(out),
            Err(err) => warn!("transformation '{name}' failed on {value}: {err}"),
        }
    }
    if input.finished {
        state.finish();
    }
}
