//! Text renderings of a sealed DAG: canonical S-expressions and Graphviz.

use std::fmt::Write;

use crate::dag::Dag;
use crate::eval::EvalContext;
use crate::node::{NodeId, NodeKind};

impl Dag {
    /// Canonical S-expression bytes of `id`, exactly as hashed into its
    /// identity. Children of commutative calls appear in sorted order.
    pub fn to_s_bytes(&self, id: NodeId) -> &[u8] {
        self.node(id).canonical()
    }

    /// Printable canonical S-expression of `id`. Bytes that are not valid
    /// UTF-8 are written as `\xNN`; raw backslashes are always escaped in the
    /// canonical form, so distinct nodes never print alike.
    pub fn to_s(&self, id: NodeId) -> String {
        printable(self.to_s_bytes(id))
    }

    /// Graphviz rendering; roots are drawn bold.
    pub fn to_dot(&self) -> String {
        self.render_dot(|_| None)
    }

    fn render_dot(&self, annotate: impl Fn(NodeId) -> Option<String>) -> String {
        let mut out = String::from("digraph predicate {\n");
        for id in self.node_ids() {
            let node = self.node(id);
            let mut label = escape_label(&node.label());
            if let Some(extra) = annotate(id) {
                label.push_str("\\n");
                label.push_str(&escape_label(&extra));
            }
            let shape = match node.kind() {
                NodeKind::Literal(_) => "box",
                NodeKind::Var(_) => "ellipse",
                NodeKind::Call(_) => "oval",
            };
            let style = if self.roots().contains(&id) {
                ", style=bold"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "  {id} [label=\"{label}\", shape={shape}{style}];"
            );
        }
        for id in self.node_ids() {
            for (position, child) in self.children(id).iter().enumerate() {
                let _ = writeln!(out, "  {id} -> {child} [label=\"{position}\"];");
            }
        }
        out.push_str("}\n");
        out
    }
}

impl EvalContext<'_> {
    /// Graphviz rendering annotated with this transaction's node states.
    pub fn to_dot(&self) -> String {
        self.dag()
            .render_dot(|id| Some(self.state_label(id)))
    }
}

fn printable(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        for byte in chunk.invalid() {
            let _ = write!(out, "\\x{byte:02x}");
        }
    }
    out
}

fn escape_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out
}
