//! Configuration-time pipeline: expand, intern, optimize, validate, seal.

use log::debug;
use pred_types::{Expr, ExprCall, ExprVar, Template, Value};

use crate::catalog::Catalog;
use crate::dag::{Dag, RootId};
use crate::environment::Environment;
use crate::error::BuildError;
use crate::functions::Function;
use crate::node::NodeId;
use crate::optimize::optimize;
use crate::registry::Registry;
use crate::template::TemplateSet;
use crate::validate::validate;

/// Single-use builder. Any error rejects the whole configuration.
pub struct Builder<'a> {
    env: &'a Environment,
    catalog: &'a Catalog,
    templates: TemplateSet,
    registry: Registry,
    roots: Vec<NodeId>,
}

impl<'a> Builder<'a> {
    pub fn new(env: &'a Environment, catalog: &'a Catalog) -> Self {
        Self {
            env,
            catalog,
            templates: TemplateSet::default(),
            registry: Registry::new(),
            roots: Vec::new(),
        }
    }

    /// Registers a template; it applies to roots added afterwards.
    pub fn add_template(&mut self, template: Template) -> Result<(), BuildError> {
        self.templates.insert(template)
    }

    /// Expands and interns one top-level expression.
    pub fn add_root(&mut self, expr: &Expr) -> Result<RootId, BuildError> {
        let expanded = self.templates.expand(expr)?;
        let id = self.intern(&expanded)?;
        self.roots.push(id);
        Ok(RootId(self.roots.len() - 1))
    }

    /// Number of distinct nodes interned so far, before optimization.
    pub fn interned(&self) -> usize {
        self.registry.len()
    }

    pub fn finish(self) -> Result<Dag, BuildError> {
        let interned = self.registry.len();
        let (registry, roots) = optimize(&self.registry, &self.roots, self.catalog)?;
        validate(&registry, self.env)?;
        debug!(
            "sealed dag: {} roots, {} templates, {} interned nodes, {} after optimization",
            roots.len(),
            self.templates.len(),
            interned,
            registry.len()
        );
        Ok(Dag::seal(registry, roots))
    }

    fn intern(&mut self, expr: &Expr) -> Result<NodeId, BuildError> {
        match expr {
            Expr::Literal(literal) if !literal.lit.is_finite() => {
                Err(BuildError::NonFiniteLiteral(literal.lit.to_string()))
            }
            Expr::Literal(literal) => Ok(self.registry.intern_literal(literal.lit.clone())),
            Expr::Var(var) => self.intern_var(var),
            Expr::Ref(reference) => Err(BuildError::UnboundReference(
                reference.reference.clone(),
            )),
            Expr::Call(call) => self.intern_call(call),
        }
    }

    fn intern_var(&mut self, var: &ExprVar) -> Result<NodeId, BuildError> {
        let declared = self
            .env
            .default_window(&var.var)
            .ok_or_else(|| BuildError::UnknownVar(var.var.clone()))?;
        let window = var
            .window
            .or(declared)
            .ok_or_else(|| BuildError::MissingPhaseWindow(var.var.clone()))?;
        Ok(self.registry.intern_var(&var.var, window))
    }

    fn intern_call(&mut self, call: &ExprCall) -> Result<NodeId, BuildError> {
        let (function, prefix) = self.resolve(call)?;
        let mut args = Vec::with_capacity(call.args.len() + 1);
        args.extend(prefix);
        for arg in &call.args {
            args.push(self.intern(arg)?);
        }
        Ok(self.registry.intern_call(function, args))
    }

    /// Maps a call name to a built-in. Catalogue names are sugar for the
    /// explicit `operator`/`transformation` forms, whose name literal is
    /// returned as a leading argument.
    fn resolve(&mut self, call: &ExprCall) -> Result<(Function, Option<NodeId>), BuildError> {
        let name = call.call.as_str();
        if let Some(function) = Function::from_tag(name) {
            function.check_arity(call.args.len())?;
            return Ok((function, None));
        }
        let function = if self.catalog.operator(name).is_some() {
            Function::Operator
        } else if self.catalog.transformation(name).is_some() {
            Function::Transformation
        } else {
            return Err(BuildError::UnknownFunction(name.to_string()));
        };
        function.check_arity(call.args.len() + 1).map_err(|_| BuildError::Arity {
            function: name.to_string(),
            expected: (function.signature().arity.minimum() - 1).to_string(),
            actual: call.args.len(),
        })?;
        let literal = self.registry.intern_literal(Value::string(name));
        Ok((function, Some(literal)))
    }
}

/// Builds a sealed DAG from top-level expressions in one call.
pub fn build<'e>(
    exprs: impl IntoIterator<Item = &'e Expr>,
    templates: impl IntoIterator<Item = Template>,
    env: &Environment,
    catalog: &Catalog,
) -> Result<Dag, BuildError> {
    let mut builder = Builder::new(env, catalog);
    for template in templates {
        builder.add_template(template)?;
    }
    for expr in exprs {
        builder.add_root(expr)?;
    }
    builder.finish()
}
