use std::collections::HashMap;

use pred_types::Identity;

use crate::eval::EvalContext;
use crate::node::{Node, NodeId, NodeKind};
use crate::registry::Registry;

/// Handle of a top-level expression, in the order roots were added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(pub(crate) usize);

impl RootId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Sealed, read-only expression graph shared by every transaction.
///
/// There is no API to mutate a `Dag`; per-transaction state lives in
/// [`EvalContext`].
#[derive(Debug)]
pub struct Dag {
    nodes: Vec<Node>,
    parents: Vec<Vec<NodeId>>,
    roots: Vec<NodeId>,
    vars: Vec<NodeId>,
    by_identity: HashMap<Identity, NodeId>,
}

impl Dag {
    pub(crate) fn seal(registry: Registry, roots: Vec<NodeId>) -> Self {
        let (nodes, by_identity) = registry.into_parts();
        let mut parents = vec![Vec::new(); nodes.len()];
        let mut vars = Vec::new();
        for (index, node) in nodes.iter().enumerate() {
            let id = NodeId::from_index(index);
            match node.kind() {
                NodeKind::Var(_) => vars.push(id),
                NodeKind::Call(call) => {
                    for child in &call.args {
                        let list: &mut Vec<NodeId> = &mut parents[child.index()];
                        if !list.contains(&id) {
                            list.push(id);
                        }
                    }
                }
                NodeKind::Literal(_) => {}
            }
        }
        Dag {
            nodes,
            parents,
            roots,
            vars,
            by_identity,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    pub fn root(&self, root: RootId) -> NodeId {
        self.roots[root.0]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn root_ids(&self) -> impl Iterator<Item = RootId> {
        (0..self.roots.len()).map(RootId)
    }

    /// Var nodes in arena order.
    pub fn vars(&self) -> &[NodeId] {
        &self.vars
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// Calls that use `id` as an argument. Informational only.
    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        &self.parents[id.index()]
    }

    pub fn find(&self, identity: &Identity) -> Option<NodeId> {
        self.by_identity.get(identity).copied()
    }

    /// Looks a node up by its canonical text.
    pub fn find_canonical(&self, canonical: &str) -> Option<NodeId> {
        self.find(&Identity::of_canonical(canonical.as_bytes()))
    }

    pub fn new_context(&self) -> EvalContext<'_> {
        EvalContext::new(self)
    }
}
