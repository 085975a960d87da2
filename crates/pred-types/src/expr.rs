//! Parsed expression trees handed to the builder by a front-end.
//!
//! Trees are plain owned data; sharing only happens once they are interned.

use serde::{Deserialize, Serialize};

use crate::phase::PhaseWindow;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expr {
    Call(ExprCall),
    Var(ExprVar),
    Ref(ExprRef),
    Literal(ExprLiteral),
}

/// Function application: `{"call": "and", "args": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprCall {
    pub call: String,
    #[serde(default)]
    pub args: Vec<Expr>,
}

/// Reference to a host data source: `{"var": "ARGS"}`.
///
/// Without an explicit window the environment's declared window is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprVar {
    pub var: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<PhaseWindow>,
}

/// Template parameter reference: `{"ref": "input"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprRef {
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprLiteral {
    pub lit: Value,
}

impl Expr {
    pub fn call(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Call(ExprCall {
            call: name.into(),
            args: args.into_iter().collect(),
        })
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(ExprVar {
            var: name.into(),
            window: None,
        })
    }

    pub fn var_in(name: impl Into<String>, window: PhaseWindow) -> Self {
        Expr::Var(ExprVar {
            var: name.into(),
            window: Some(window),
        })
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(ExprLiteral { lit: value.into() })
    }

    pub fn reference(param: impl Into<String>) -> Self {
        Expr::Ref(ExprRef {
            reference: param.into(),
        })
    }

    /// Canonical true literal.
    pub fn truthy() -> Self {
        Expr::lit(Value::string(""))
    }

    /// Canonical false literal.
    pub fn falsy() -> Self {
        Expr::lit(Value::list([]))
    }
}

/// Named, parametrised macro expanded before interning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    pub body: Expr,
}

impl Template {
    pub fn new(
        name: impl Into<String>,
        params: impl IntoIterator<Item = impl Into<String>>,
        body: Expr,
    ) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;
    use serde_json::json;

    #[test]
    fn expr_serializes_to_expected_shape() {
        let expr = Expr::call(
            "not",
            [Expr::call(
                "rx",
                [Expr::lit("foo"), Expr::var("ARGS")],
            )],
        );
        let value = serde_json::to_value(&expr).unwrap();
        assert_eq!(
            value,
            json!({
                "call": "not",
                "args": [{
                    "call": "rx",
                    "args": [{"lit": {"text": "foo"}}, {"var": "ARGS"}]
                }]
            })
        );
        let back: Expr = serde_json::from_value(value).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn var_window_and_ref_parse() {
        let expr: Expr = serde_json::from_value(json!({
            "call": "cat",
            "args": [
                {"var": "ARGS", "window": {"first": "REQUEST_HEADER", "last": "REQUEST_BODY"}},
                {"ref": "x"}
            ]
        }))
        .unwrap();
        let Expr::Call(call) = expr else {
            panic!("expected call");
        };
        match &call.args[0] {
            Expr::Var(var) => {
                let window = var.window.expect("window");
                assert_eq!(window.first(), Phase::RequestHeader);
                assert_eq!(window.last(), Phase::RequestBody);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(call.args[1], Expr::reference("x"));
    }

    #[test]
    fn template_without_params_defaults_empty() {
        let template: Template =
            serde_json::from_value(json!({"name": "always", "body": {"call": "true"}})).unwrap();
        assert!(template.params.is_empty());
    }
}
