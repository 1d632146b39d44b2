//! A single registered procedure.

use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::handler::ProcedureHandler;
use crate::pattern::{CompiledPattern, PatternError, trim_method};

/// One routable method: pattern, action, constraints and middleware.
///
/// The compiled matcher is built lazily and cached; pattern and constraints
/// are treated as immutable once compiled, so no invalidation is needed. The
/// fluent mutators are meant for the registration phase only. Bound
/// parameters are never stored here; each dispatch binds into its own scope.
pub struct ProcedureDefinition {
    method: String,
    action: Arc<dyn ProcedureHandler>,
    action_name: Option<String>,
    namespace: Option<String>,
    wheres: HashMap<String, String>,
    defaults: HashMap<String, Value>,
    middleware: Vec<String>,
    excluded_middleware: Vec<String>,
    is_fallback: bool,
    compiled: OnceCell<CompiledPattern>,
}

impl ProcedureDefinition {
    pub fn new(method: &str, action: Arc<dyn ProcedureHandler>) -> Self {
        Self {
            method: trim_method(method).to_string(),
            action,
            action_name: None,
            namespace: None,
            wheres: HashMap::new(),
            defaults: HashMap::new(),
            middleware: Vec::new(),
            excluded_middleware: Vec::new(),
            is_fallback: false,
            compiled: OnceCell::new(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn action(&self) -> &Arc<dyn ProcedureHandler> {
        &self.action
    }

    pub fn action_name(&self) -> Option<&str> {
        self.action_name.as_deref()
    }

    pub fn wheres(&self) -> &HashMap<String, String> {
        &self.wheres
    }

    pub fn defaults(&self) -> &HashMap<String, Value> {
        &self.defaults
    }

    pub fn middleware_names(&self) -> &[String] {
        &self.middleware
    }

    pub fn excluded_middleware(&self) -> &[String] {
        &self.excluded_middleware
    }

    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    /// Constrain a parameter with a regular expression.
    pub fn where_(&mut self, name: impl Into<String>, pattern: impl Into<String>) -> &mut Self {
        self.wheres.insert(name.into(), pattern.into());
        self
    }

    /// Register a default value applied when a parameter is absent.
    pub fn default_value(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.defaults.insert(name.into(), value);
        self
    }

    /// Append middleware names to this definition.
    pub fn middleware<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(names.into_iter().map(Into::into));
        self
    }

    /// Exclude middleware by name (or family name) from this definition.
    pub fn without_middleware<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_middleware
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Mark this definition as a catch-all, evaluated after all specific
    /// definitions regardless of registration order.
    pub fn fallback(&mut self) -> &mut Self {
        self.is_fallback = true;
        self
    }

    /// Name the action for introspection. A group namespace, when present,
    /// is prepended unless the name is already qualified.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.action_name = Some(match &self.namespace {
            Some(namespace) if !name.contains("::") && !name.starts_with(namespace.as_str()) => {
                format!("{}::{}", namespace, name)
            }
            _ => name,
        });
        self
    }

    pub(crate) fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace;
    }

    pub(crate) fn prepend_middleware(&mut self, names: Vec<String>) {
        let mut merged = names;
        merged.extend(self.middleware.drain(..));
        self.middleware = merged;
    }

    pub(crate) fn merge_wheres(&mut self, wheres: &HashMap<String, String>) {
        // Existing (closer to the route) constraints win on collision.
        for (name, pattern) in wheres {
            self.wheres
                .entry(name.clone())
                .or_insert_with(|| pattern.clone());
        }
    }

    /// The compiled matcher, built on first use and cached.
    pub fn compiled(&self) -> Result<&CompiledPattern, PatternError> {
        self.compiled
            .get_or_try_init(|| CompiledPattern::compile(&self.method, &self.wheres))
    }

    /// Structural match against the concrete method string.
    ///
    /// `including_pattern` exists for alternate validators that check
    /// structure without re-checking the method token; with the single
    /// built-in validator the flag is inert.
    pub fn matches(&self, method: &str, _including_pattern: bool) -> bool {
        match self.compiled() {
            Ok(compiled) => compiled.matches(method),
            Err(error) => {
                warn!(pattern = %self.method, %error, "pattern failed to compile during match");
                false
            }
        }
    }

    /// Named captures present in the concrete method.
    pub fn extract_parameters(&self, method: &str) -> HashMap<String, String> {
        match self.compiled() {
            Ok(compiled) => compiled.extract(method),
            Err(_) => HashMap::new(),
        }
    }

    /// Definition middleware first, then whatever the handler type declares
    /// for itself.
    pub fn gather_middleware(&self) -> Vec<String> {
        let mut gathered = self.middleware.clone();
        gathered.extend(self.action.declared_middleware());
        gathered
    }
}

impl fmt::Debug for ProcedureDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureDefinition")
            .field("method", &self.method)
            .field("action_name", &self.action_name)
            .field("wheres", &self.wheres)
            .field("middleware", &self.middleware)
            .field("is_fallback", &self.is_fallback)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnHandler;

    fn noop() -> Arc<dyn ProcedureHandler> {
        Arc::new(FnHandler::new(|_, _| Box::pin(async { Ok(().into()) })))
    }

    #[test]
    fn test_matches_and_extracts() {
        let definition = ProcedureDefinition::new("hello.{name}", noop());
        assert!(definition.matches("hello.World", true));
        assert!(!definition.matches("goodbye.World", true));

        let values = definition.extract_parameters("hello.World");
        assert_eq!(values.get("name").map(String::as_str), Some("World"));
    }

    #[test]
    fn test_where_constraint_applies() {
        let mut definition = ProcedureDefinition::new("users.{id}", noop());
        definition.where_("id", r"\d+");
        assert!(definition.matches("users.7", true));
        assert!(!definition.matches("users.seven", true));
    }

    #[test]
    fn test_compile_is_memoized() {
        let definition = ProcedureDefinition::new("a.{b}", noop());
        let first = definition.compiled().unwrap() as *const CompiledPattern;
        let second = definition.compiled().unwrap() as *const CompiledPattern;
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_pattern_never_matches() {
        let definition = ProcedureDefinition::new("broken.{a?}.{b}", noop());
        assert!(!definition.matches("broken.x.y", true));
        assert!(definition.compiled().is_err());
    }

    #[test]
    fn test_gather_middleware_order() {
        let handler = FnHandler::new(|_, _| Box::pin(async { Ok(().into()) }))
            .with_middleware(["class-level"]);
        let mut definition = ProcedureDefinition::new("x", Arc::new(handler));
        definition.middleware(["route-level"]);
        assert_eq!(
            definition.gather_middleware(),
            vec!["route-level", "class-level"]
        );
    }

    #[test]
    fn test_namespace_prepended_to_action_name() {
        let mut definition = ProcedureDefinition::new("billing.charge", noop());
        definition.set_namespace(Some("billing".to_string()));
        definition.named("ChargeProcedure");
        assert_eq!(definition.action_name(), Some("billing::ChargeProcedure"));

        definition.named("other::Qualified");
        assert_eq!(definition.action_name(), Some("other::Qualified"));
    }

    #[test]
    fn test_merge_wheres_keeps_closer_constraint() {
        let mut definition = ProcedureDefinition::new("users.{id}", noop());
        definition.where_("id", r"\d+");
        definition.merge_wheres(&HashMap::from([
            ("id".to_string(), "[a-z]+".to_string()),
            ("page".to_string(), r"\d+".to_string()),
        ]));
        assert_eq!(definition.wheres().get("id").unwrap(), r"\d+");
        assert_eq!(definition.wheres().get("page").unwrap(), r"\d+");
    }
}
