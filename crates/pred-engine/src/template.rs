//! Template expansion. Runs on front-end trees before anything is interned.

use std::collections::HashMap;

use indexmap::IndexMap;
use pred_types::{Expr, ExprCall, Template};

use crate::error::BuildError;
use crate::functions::Function;

#[derive(Debug, Clone, Default)]
pub(crate) struct TemplateSet {
    templates: IndexMap<String, Template>,
}

type Bindings<'a> = HashMap<&'a str, Expr>;

impl TemplateSet {
    pub fn insert(&mut self, template: Template) -> Result<(), BuildError> {
        if Function::from_tag(&template.name).is_some()
            || self.templates.contains_key(&template.name)
        {
            return Err(BuildError::DuplicateTemplate(template.name));
        }
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `expr` with every template call replaced by its body.
    pub fn expand(&self, expr: &Expr) -> Result<Expr, BuildError> {
        let mut stack = Vec::new();
        self.expand_in(expr, None, &mut stack)
    }

    fn expand_in(
        &self,
        expr: &Expr,
        bindings: Option<&Bindings<'_>>,
        stack: &mut Vec<String>,
    ) -> Result<Expr, BuildError> {
        match expr {
            Expr::Literal(_) | Expr::Var(_) => Ok(expr.clone()),
            Expr::Ref(reference) => bindings
                .and_then(|b| b.get(reference.reference.as_str()))
                .cloned()
                .ok_or_else(|| BuildError::UnboundReference(reference.reference.clone())),
            Expr::Call(call) => {
                let args = call
                    .args
                    .iter()
                    .map(|arg| self.expand_in(arg, bindings, stack))
                    .collect::<Result<Vec<_>, _>>()?;
                match self.templates.get(&call.call) {
                    Some(template) => self.instantiate(template, args, stack),
                    None => Ok(Expr::Call(ExprCall {
                        call: call.call.clone(),
                        args,
                    })),
                }
            }
        }
    }

    fn instantiate(
        &self,
        template: &Template,
        args: Vec<Expr>,
        stack: &mut Vec<String>,
    ) -> Result<Expr, BuildError> {
        if args.len() != template.params.len() {
            return Err(BuildError::Arity {
                function: template.name.clone(),
                expected: template.params.len().to_string(),
                actual: args.len(),
            });
        }
        if stack.contains(&template.name) {
            let mut chain = stack.clone();
            chain.push(template.name.clone());
            return Err(BuildError::TemplateRecursion { chain });
        }
        let bindings: Bindings<'_> = template
            .params
            .iter()
            .map(String::as_str)
            .zip(args)
            .collect();
        stack.push(template.name.clone());
        let expanded = self.expand_in(&template.body, Some(&bindings), stack);
        stack.pop();
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(templates: impl IntoIterator<Item = Template>) -> TemplateSet {
        let mut set = TemplateSet::default();
        for template in templates {
            set.insert(template).unwrap();
        }
        set
    }

    #[test]
    fn substitutes_params() {
        let set = set([Template::new(
            "has_foo",
            ["x"],
            Expr::call("rx", [Expr::lit("foo"), Expr::reference("x")]),
        )]);
        let expanded = set
            .expand(&Expr::call("not", [Expr::call("has_foo", [Expr::var("ARGS")])]))
            .unwrap();
        assert_eq!(
            expanded,
            Expr::call("not", [Expr::call("rx", [Expr::lit("foo"), Expr::var("ARGS")])])
        );
    }

    #[test]
    fn nested_templates_see_their_own_params() {
        let set = set([
            Template::new("inner", ["y"], Expr::call("first", [Expr::reference("y")])),
            Template::new(
                "outer",
                ["x"],
                Expr::call("inner", [Expr::call("rest", [Expr::reference("x")])]),
            ),
        ]);
        let expanded = set.expand(&Expr::call("outer", [Expr::var("A")])).unwrap();
        assert_eq!(
            expanded,
            Expr::call("first", [Expr::call("rest", [Expr::var("A")])])
        );
    }

    #[test]
    fn detects_indirect_recursion() {
        let set = set([
            Template::new("a", ["x"], Expr::call("b", [Expr::reference("x")])),
            Template::new("b", ["x"], Expr::call("a", [Expr::reference("x")])),
        ]);
        let err = set.expand(&Expr::call("a", [Expr::var("A")])).unwrap_err();
        assert_eq!(
            err,
            BuildError::TemplateRecursion {
                chain: vec!["a".into(), "b".into(), "a".into()]
            }
        );
    }

    #[test]
    fn unbound_and_arity_errors() {
        let set = set([Template::new("t", ["x"], Expr::reference("y"))]);
        assert_eq!(
            set.expand(&Expr::call("t", [Expr::var("A")])).unwrap_err(),
            BuildError::UnboundReference("y".into())
        );
        assert!(matches!(
            set.expand(&Expr::call("t", Vec::<Expr>::new())).unwrap_err(),
            BuildError::Arity { actual: 0, .. }
        ));
        assert_eq!(
            set.expand(&Expr::reference("x")).unwrap_err(),
            BuildError::UnboundReference("x".into())
        );
    }

    #[test]
    fn rejects_duplicates_and_builtin_names() {
        let mut set = TemplateSet::default();
        set.insert(Template::new("t", Vec::<String>::new(), Expr::truthy()))
            .unwrap();
        assert_eq!(
            set.insert(Template::new("t", Vec::<String>::new(), Expr::truthy())),
            Err(BuildError::DuplicateTemplate("t".into()))
        );
        assert_eq!(
            set.insert(Template::new("and", Vec::<String>::new(), Expr::truthy())),
            Err(BuildError::DuplicateTemplate("and".into()))
        );
    }
}
