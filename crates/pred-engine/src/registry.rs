//! Build-time hash-consing registry.
//!
//! Nodes are appended bottom-up, so every child index is smaller than the
//! index of any call that references it.

use std::collections::HashMap;
use std::sync::Arc;

use pred_types::{Identity, PhaseWindow, Value, canonical};

use crate::functions::Function;
use crate::node::{CallNode, LiteralNode, Node, NodeId, NodeKind, Prepared, VarNode};

#[derive(Debug, Default)]
pub(crate) struct Registry {
    nodes: Vec<Node>,
    index: HashMap<Identity, NodeId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    pub fn into_parts(self) -> (Vec<Node>, HashMap<Identity, NodeId>) {
        (self.nodes, self.index)
    }

    pub fn intern_literal(&mut self, value: Value) -> NodeId {
        let canonical = value.to_canonical();
        self.intern(canonical, NodeKind::Literal(LiteralNode::new(value)))
    }

    pub fn intern_var(&mut self, name: &str, window: PhaseWindow) -> NodeId {
        let mut canonical = b"(var ".to_vec();
        canonical::write_string(&mut canonical, name.as_bytes());
        canonical.push(b' ');
        canonical::write_string(&mut canonical, window.first().as_str().as_bytes());
        canonical.push(b' ');
        canonical::write_string(&mut canonical, window.last().as_str().as_bytes());
        canonical.push(b')');
        self.intern(
            canonical,
            NodeKind::Var(VarNode {
                name: name.to_string(),
                window,
            }),
        )
    }

    /// Interns `(tag child...)`. Children of commutative functions are put in
    /// canonical byte order first, so argument order does not affect identity.
    pub fn intern_call(&mut self, function: Function, args: Vec<NodeId>) -> NodeId {
        self.intern_prepared(function, args, Prepared::None)
    }

    pub fn intern_prepared(
        &mut self,
        function: Function,
        mut args: Vec<NodeId>,
        prepared: Prepared,
    ) -> NodeId {
        if function.is_commutative() {
            args.sort_by(|a, b| self.node(*a).canonical.cmp(&self.node(*b).canonical));
        }
        let mut canonical = Vec::with_capacity(16);
        canonical.push(b'(');
        canonical.extend_from_slice(function.tag().as_bytes());
        for arg in &args {
            canonical.push(b' ');
            canonical.extend_from_slice(&self.node(*arg).canonical);
        }
        canonical.push(b')');
        let mut call = CallNode::new(function, args);
        call.prepared = prepared;
        self.intern(canonical, NodeKind::Call(call))
    }

    fn intern(&mut self, canonical: Vec<u8>, kind: NodeKind) -> NodeId {
        let identity = Identity::of_canonical(&canonical);
        if let Some(existing) = self.index.get(&identity) {
            return *existing;
        }
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node {
            identity,
            canonical: Arc::from(canonical),
            kind,
        });
        self.index.insert(identity, id);
        id
    }

    /// Drops every node not reachable from `roots`, rewriting `roots` in place.
    pub fn compact(self, roots: &mut [NodeId]) -> Registry {
        let mut reachable = vec![false; self.nodes.len()];
        let mut stack: Vec<NodeId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut reachable[id.index()], true) {
                continue;
            }
            stack.extend_from_slice(self.node(id).children());
        }

        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut out = Registry::new();
        for (old, mut node) in self.nodes.into_iter().enumerate() {
            if !reachable[old] {
                continue;
            }
            if let NodeKind::Call(call) = &mut node.kind {
                for arg in &mut call.args {
                    *arg = remap[arg.index()]
                        .unwrap_or_else(|| panic!("child {arg} of live node {old} was swept"));
                }
            }
            let id = NodeId::from_index(out.nodes.len());
            out.index.insert(node.identity, id);
            out.nodes.push(node);
            remap[old] = Some(id);
        }
        for root in roots.iter_mut() {
            *root = remap[root.index()]
                .unwrap_or_else(|| panic!("root {root} missing after compaction"));
        }
        out
    }
}
