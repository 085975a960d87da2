use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, trace};
use pred_types::{Phase, ValueList};

use super::source::VarSource;
use crate::dag::{Dag, RootId};
use crate::error::EvalError;
use crate::functions::Function;
use crate::node::{NodeId, NodeKind};
use crate::step::{ArgView, NodeState, step};

/// Read-only view of one node's state in a transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeView<'a> {
    pub values: &'a ValueList,
    pub finished: bool,
}

impl NodeView<'_> {
    pub fn is_truthy(&self) -> bool {
        self.values.is_truthy()
    }
}

/// Roots whose state changed during one phase advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Roots that became truthy during this phase.
    pub ready: Vec<RootId>,
    /// Roots that became finished during this phase.
    pub finished: Vec<RootId>,
    /// Call nodes stepped during this phase.
    pub evaluated: usize,
}

/// Per-transaction evaluation state over a sealed [`Dag`].
///
/// Creating a context allocates nothing per node; state is created the first
/// time a node is evaluated. Dropping the context discards the transaction.
#[derive(Debug)]
pub struct EvalContext<'d> {
    dag: &'d Dag,
    states: HashMap<NodeId, NodeState>,
    stale: HashSet<NodeId>,
    visited: HashSet<NodeId>,
    /// Vars the source itself declared finished; they may never grow again.
    closed_by_source: HashSet<NodeId>,
    phase: Option<Phase>,
    empty: ValueList,
}

impl<'d> EvalContext<'d> {
    pub fn new(dag: &'d Dag) -> Self {
        Self {
            dag,
            states: HashMap::new(),
            stale: HashSet::new(),
            visited: HashSet::new(),
            closed_by_source: HashSet::new(),
            phase: None,
            empty: ValueList::new(),
        }
    }

    pub fn dag(&self) -> &'d Dag {
        self.dag
    }

    /// Last phase delivered, if any.
    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    /// Pulls new var values for `phase` and evaluates every root to a fixed
    /// point. Phases must be delivered in strictly increasing order.
    pub fn advance_phase(
        &mut self,
        phase: Phase,
        source: &dyn VarSource,
    ) -> Result<PhaseReport, EvalError> {
        if let Some(previous) = self.phase {
            if phase <= previous {
                return Err(EvalError::PhaseOrder {
                    previous,
                    next: phase,
                });
            }
        }
        let dag = self.dag;
        // Folded literal roots are already decided; the first phase still
        // reports them once.
        let before: Vec<(bool, bool)> = match self.phase {
            None => vec![(false, false); dag.roots().len()],
            Some(_) => dag
                .roots()
                .iter()
                .map(|root| (self.is_ready(*root), self.is_finished(*root)))
                .collect(),
        };
        self.phase = Some(phase);

        let changed = self.refresh_vars(phase, source);
        self.mark_stale(&changed);

        self.visited.clear();
        let mut evaluated = 0;
        for root in dag.roots() {
            evaluated += self.pull(*root);
        }

        let mut report = PhaseReport {
            phase,
            ready: Vec::new(),
            finished: Vec::new(),
            evaluated,
        };
        for (root, (was_ready, was_finished)) in dag.root_ids().zip(before) {
            let node = dag.root(root);
            if !was_ready && self.is_ready(node) {
                report.ready.push(root);
            }
            if !was_finished && self.is_finished(node) {
                report.finished.push(root);
            }
        }
        debug!(
            "phase {phase}: {} vars changed, {} nodes evaluated, {} roots ready, {} finished",
            changed.len(),
            evaluated,
            report.ready.len(),
            report.finished.len()
        );
        Ok(report)
    }

    /// Current view of `id`. Roots are always current after a phase advance.
    /// An interior node whose only parents finished or short-circuited is no
    /// longer pulled, so its view may lag behind the var data: a consistent
    /// prefix of what full evaluation would give.
    pub fn query(&self, id: NodeId) -> NodeView<'_> {
        if let NodeKind::Literal(literal) = self.dag.node(id).kind() {
            return NodeView {
                values: &literal.list,
                finished: true,
            };
        }
        match self.states.get(&id) {
            Some(state) => NodeView {
                values: &state.values,
                finished: state.finished,
            },
            None => NodeView {
                values: &self.empty,
                finished: false,
            },
        }
    }

    pub fn query_root(&self, root: RootId) -> NodeView<'_> {
        self.query(self.dag.root(root))
    }

    /// True while the node's current value list is truthy. Never reverts
    /// within a transaction.
    pub fn is_ready(&self, id: NodeId) -> bool {
        self.query(id).is_truthy()
    }

    pub fn is_finished(&self, id: NodeId) -> bool {
        self.query(id).finished
    }

    /// Appends newly available values to every open var. Returns the vars
    /// whose state changed.
    fn refresh_vars(&mut self, phase: Phase, source: &dyn VarSource) -> Vec<NodeId> {
        let dag = self.dag;
        let mut changed = Vec::new();
        for &id in dag.vars() {
            let Some(var) = dag.node(id).as_var() else {
                continue;
            };
            if !var.window.is_open_at(phase) {
                continue;
            }
            let state = self.states.entry(id).or_default();
            if state.finished && !self.closed_by_source.contains(&id) {
                continue;
            }
            let values = source.values(&var.name);
            let seen = state.values.len();
            assert!(
                values.len() >= seen,
                "var {} shrank from {seen} to {} values",
                var.name,
                values.len()
            );
            assert!(
                state.values.as_slice() == &values[..seen],
                "var {} rewrote earlier values",
                var.name
            );
            if state.finished {
                assert!(
                    values.len() == seen,
                    "var {} received {} values after it finished",
                    var.name,
                    values.len() - seen
                );
                continue;
            }
            let mut dirty = values.len() > seen;
            for value in &values[seen..] {
                state.append(value.clone());
            }
            let source_finished = source.is_finished(&var.name);
            if source_finished || var.window.is_closed_at(phase) {
                if source_finished {
                    self.closed_by_source.insert(id);
                }
                state.finish();
                dirty = true;
            }
            if dirty {
                trace!(
                    "var {} now has {} values (finished: {})",
                    var.name,
                    state.values.len(),
                    state.finished
                );
                changed.push(id);
            }
        }
        changed
    }

    /// Marks every ancestor of `changed` as needing re-evaluation.
    fn mark_stale(&mut self, changed: &[NodeId]) {
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = changed.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            for &parent in self.dag.parents(id) {
                if seen.insert(parent) {
                    self.stale.insert(parent);
                    queue.push_back(parent);
                }
            }
        }
    }

    /// Brings `id` up to date for the current phase, children first.
    /// Returns the number of call nodes stepped.
    fn pull(&mut self, id: NodeId) -> usize {
        let dag = self.dag;
        let NodeKind::Call(call) = dag.node(id).kind() else {
            return 0;
        };
        if !self.visited.insert(id) {
            return 0;
        }
        if let Some(state) = self.states.get(&id) {
            if state.finished || !self.stale.contains(&id) {
                self.stale.remove(&id);
                return 0;
            }
        }

        let mut evaluated = 0;
        match call.function {
            Function::AndSc | Function::OrSc => {
                let absorbing = call.function == Function::OrSc;
                for &arg in &call.args {
                    evaluated += self.pull(arg);
                    if self.decides(arg, absorbing) {
                        break;
                    }
                }
            }
            Function::If => {
                let condition = call.args[0];
                evaluated += self.pull(condition);
                let view = self.query(condition);
                let (truthy, finished) = (view.is_truthy(), view.finished);
                if truthy {
                    evaluated += self.pull(call.args[1]);
                } else if finished {
                    evaluated += self.pull(call.args[2]);
                }
            }
            _ => {
                for &arg in &call.args {
                    evaluated += self.pull(arg);
                }
            }
        }

        let mut state = self.states.remove(&id).unwrap_or_default();
        let views: Vec<ArgView<'_>> = call
            .args
            .iter()
            .map(|arg| {
                let view = self.query(*arg);
                ArgView {
                    values: view.values,
                    finished: view.finished,
                }
            })
            .collect();
        step(call, &views, &mut state);
        trace!(
            "{id} {}: {} values (finished: {})",
            call.function,
            state.values.len(),
            state.finished
        );
        self.states.insert(id, state);
        self.stale.remove(&id);
        evaluated + 1
    }

    /// True once `arg` alone fixes the result of a short-circuit boolean
    /// whose absorbing truth value is `absorbing`.
    fn decides(&self, arg: NodeId, absorbing: bool) -> bool {
        let view = self.query(arg);
        if absorbing {
            view.is_truthy()
        } else {
            view.finished && view.values.is_falsy()
        }
    }

    pub(crate) fn state_label(&self, id: NodeId) -> String {
        let view = self.query(id);
        let status = if view.finished { "finished" } else { "open" };
        format!("{} values, {status}", view.values.len())
    }
}
