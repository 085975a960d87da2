use std::fmt;
use std::sync::Arc;

use pred_types::{Identity, PhaseWindow, Value, ValueList};
use regex::Regex;

use crate::catalog::{OperatorInstance, Transformation};
use crate::functions::Function;

/// Index of a node in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index).unwrap_or_else(|_| panic!("node arena overflow at {index}"));
        NodeId(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A hash-consed node. Its identity is derived from `canonical` and never
/// changes.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) identity: Identity,
    pub(crate) canonical: Arc<[u8]>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Canonical S-expression bytes, the hash-consing key.
    pub fn canonical(&self) -> &[u8] {
        &self.canonical
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Call(call) => &call.args,
            _ => &[],
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&LiteralNode> {
        match &self.kind {
            NodeKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&VarNode> {
        match &self.kind {
            NodeKind::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&CallNode> {
        match &self.kind {
            NodeKind::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Short label used in graph renderings.
    pub fn label(&self) -> String {
        match &self.kind {
            NodeKind::Literal(literal) => literal.value.to_string(),
            NodeKind::Var(var) => format!("var {}", var.name),
            NodeKind::Call(call) => match &call.prepared {
                Prepared::Operator { name, .. } | Prepared::Transformation { name, .. } => {
                    format!("{} {name}", call.function)
                }
                _ => call.function.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Literal(LiteralNode),
    Var(VarNode),
    Call(CallNode),
}

/// Static node. `list` is the value list the literal evaluates to.
#[derive(Debug, Clone)]
pub struct LiteralNode {
    pub value: Value,
    pub list: ValueList,
}

impl LiteralNode {
    pub fn new(value: Value) -> Self {
        let list = ValueList::from_literal(&value);
        Self { value, list }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarNode {
    pub name: String,
    pub window: PhaseWindow,
}

#[derive(Debug, Clone)]
pub struct CallNode {
    pub function: Function,
    pub args: Vec<NodeId>,
    pub(crate) prepared: Prepared,
}

impl CallNode {
    pub(crate) fn new(function: Function, args: Vec<NodeId>) -> Self {
        Self {
            function,
            args,
            prepared: Prepared::None,
        }
    }
}

/// Build-time state attached to a call once its static arguments are known.
#[derive(Clone, Default)]
pub(crate) enum Prepared {
    #[default]
    None,
    Regex(Regex),
    Operator {
        name: String,
        instance: Arc<dyn OperatorInstance>,
        pure: bool,
    },
    Transformation {
        name: String,
        transformation: Arc<dyn Transformation>,
        pure: bool,
    },
}

impl Prepared {
    pub(crate) fn is_pure(&self) -> bool {
        match self {
            Prepared::Operator { pure, .. } | Prepared::Transformation { pure, .. } => *pure,
            _ => true,
        }
    }
}

impl fmt::Debug for Prepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prepared::None => f.write_str("None"),
            Prepared::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            Prepared::Operator { name, pure, .. } => f
                .debug_struct("Operator")
                .field("name", name)
                .field("pure", pure)
                .finish(),
            Prepared::Transformation { name, pure, .. } => f
                .debug_struct("Transformation")
                .field("name", name)
                .field("pure", pure)
                .finish(),
        }
    }
}
