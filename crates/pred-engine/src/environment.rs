use indexmap::IndexMap;
use pred_types::{EnvironmentConfig, PhaseWindow};

/// Var names the host acknowledges, with optional default phase windows.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: IndexMap<String, Option<PhaseWindow>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name`; a later declaration replaces an earlier one.
    pub fn declare(&mut self, name: impl Into<String>, window: Option<PhaseWindow>) -> &mut Self {
        self.vars.insert(name.into(), window);
        self
    }

    pub fn with_var(mut self, name: impl Into<String>, window: PhaseWindow) -> Self {
        self.declare(name, Some(window));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// `None` when the var is unknown, `Some(None)` when it has no default window.
    pub fn default_window(&self, name: &str) -> Option<Option<PhaseWindow>> {
        self.vars.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }
}

impl From<&EnvironmentConfig> for Environment {
    fn from(config: &EnvironmentConfig) -> Self {
        let mut env = Environment::new();
        for decl in &config.vars {
            env.declare(decl.name.clone(), decl.window);
        }
        env
    }
}
