//! The procedure registry: ordered definitions plus the group stack.

use std::collections::HashMap;
use tracing::debug;

use crate::definition::ProcedureDefinition;
use crate::error::RouterError;
use crate::group::GroupAttributes;
use crate::pattern::{PatternError, trim_method};

/// Ordered collection of registered procedure definitions.
///
/// Lookup is exact-method first (a fast path keyed by the literal method
/// string), then a linear scan in registration order with fallback-marked
/// definitions always tried last. Registering an exact method string twice
/// replaces the earlier definition: last write wins, not multi-dispatch.
///
/// The registry is built once during the registration phase (`&mut self`)
/// and is read-only during dispatch, so concurrent `match_method` calls need
/// no locking.
#[derive(Debug, Default)]
pub struct ProcedureRegistry {
    definitions: Vec<ProcedureDefinition>,
    by_method: HashMap<String, usize>,
    group_stack: Vec<GroupAttributes>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition. On an exact-method collision the new definition
    /// replaces the old one and takes the new registration's position in
    /// scan order.
    pub fn add(&mut self, definition: ProcedureDefinition) -> &mut ProcedureDefinition {
        let method = definition.method().to_string();

        if let Some(index) = self.by_method.remove(&method) {
            debug!(%method, "replacing existing procedure definition");
            self.definitions.remove(index);
            for slot in self.by_method.values_mut() {
                if *slot > index {
                    *slot -= 1;
                }
            }
        }

        self.definitions.push(definition);
        self.by_method.insert(method, self.definitions.len() - 1);
        self.definitions.last_mut().expect("just pushed")
    }

    /// All definitions, or the definition keyed by an exact method string.
    pub fn get(&self, method: Option<&str>) -> Vec<&ProcedureDefinition> {
        match method {
            None => self.definitions.iter().collect(),
            Some(method) => self
                .by_method
                .get(trim_method(method))
                .map(|&index| vec![&self.definitions[index]])
                .unwrap_or_default(),
        }
    }

    /// Registered method strings in scan order.
    pub fn methods(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.method()).collect()
    }

    /// Look up a definition by its introspection action name.
    pub fn get_by_action(&self, action_name: &str) -> Option<&ProcedureDefinition> {
        self.definitions
            .iter()
            .find(|d| d.action_name() == Some(action_name))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcedureDefinition> {
        self.definitions.iter()
    }

    /// Find the definition matching a concrete method string.
    ///
    /// Exact lookup first; otherwise a scan in registration order, trying
    /// fallback-marked definitions last. First structural match wins.
    pub fn match_method(&self, method: &str) -> Result<&ProcedureDefinition, RouterError> {
        let trimmed = trim_method(method);

        if let Some(&index) = self.by_method.get(trimmed) {
            let definition = &self.definitions[index];
            if definition.matches(trimmed, true) {
                return Ok(definition);
            }
        }

        self.definitions
            .iter()
            .filter(|d| !d.is_fallback())
            .find(|d| d.matches(trimmed, true))
            .or_else(|| {
                self.definitions
                    .iter()
                    .filter(|d| d.is_fallback())
                    .find(|d| d.matches(trimmed, true))
            })
            .ok_or_else(|| RouterError::NotFound {
                method: trimmed.to_string(),
            })
    }

    /// Eagerly compile every definition's matcher. Called at the end of the
    /// registration phase so malformed patterns fail at startup instead of
    /// surfacing as dispatch-time internal errors.
    pub fn ensure_compiled(&self) -> Result<(), PatternError> {
        for definition in &self.definitions {
            definition.compiled()?;
        }
        Ok(())
    }

    // Group stack. Pushes and pops are balanced by construction: the only
    // caller is the router's closure-scoped `group()`.

    pub(crate) fn push_group(&mut self, attributes: GroupAttributes) {
        let merged = match self.group_stack.last() {
            Some(current) => GroupAttributes::merge(&attributes, current, true),
            None => attributes,
        };
        self.group_stack.push(merged);
    }

    pub(crate) fn pop_group(&mut self) {
        self.group_stack.pop();
    }

    pub(crate) fn current_group(&self) -> Option<&GroupAttributes> {
        self.group_stack.last()
    }

    pub fn has_group_stack(&self) -> bool {
        !self.group_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{FnHandler, ProcedureHandler};
    use std::sync::Arc;

    fn noop() -> Arc<dyn ProcedureHandler> {
        Arc::new(FnHandler::new(|_, _| Box::pin(async { Ok(().into()) })))
    }

    fn definition(pattern: &str) -> ProcedureDefinition {
        ProcedureDefinition::new(pattern, noop())
    }

    #[test]
    fn test_exact_match_wins_over_earlier_pattern() {
        let mut registry = ProcedureRegistry::new();
        registry.add(definition("users.{action}"));
        registry.add(definition("users.list"));

        let matched = registry.match_method("users.list").unwrap();
        assert_eq!(matched.method(), "users.list");

        // Pattern still catches everything else.
        let matched = registry.match_method("users.get").unwrap();
        assert_eq!(matched.method(), "users.{action}");
    }

    #[test]
    fn test_fallback_tried_last() {
        let mut registry = ProcedureRegistry::new();
        registry.add(definition("{anything}")).fallback();
        registry.add(definition("ping"));

        let matched = registry.match_method("ping").unwrap();
        assert_eq!(matched.method(), "ping");

        let matched = registry.match_method("unknown").unwrap();
        assert_eq!(matched.method(), "{anything}");
    }

    #[test]
    fn test_replacement_semantics() {
        let mut registry = ProcedureRegistry::new();
        registry.add(definition("ping")).named("first");
        registry.add(definition("ping")).named("second");

        assert_eq!(registry.len(), 1);
        let matched = registry.match_method("ping").unwrap();
        assert_eq!(matched.action_name(), Some("second"));
    }

    #[test]
    fn test_replacement_keeps_other_indexes_valid() {
        let mut registry = ProcedureRegistry::new();
        registry.add(definition("a"));
        registry.add(definition("b"));
        registry.add(definition("a"));

        assert_eq!(registry.methods(), vec!["b", "a"]);
        assert_eq!(registry.match_method("b").unwrap().method(), "b");
        assert_eq!(registry.match_method("a").unwrap().method(), "a");
    }

    #[test]
    fn test_not_found() {
        let registry = ProcedureRegistry::new();
        let err = registry.match_method("nope").unwrap_err();
        let RouterError::NotFound { method } = err;
        assert_eq!(method, "nope");
    }

    #[test]
    fn test_registration_order_tie_break() {
        let mut registry = ProcedureRegistry::new();
        registry.add(definition("items.{a}")).named("first");
        registry.add(definition("items.{b}")).named("second");

        let matched = registry.match_method("items.x").unwrap();
        assert_eq!(matched.action_name(), Some("first"));
    }

    #[test]
    fn test_get_by_exact_method() {
        let mut registry = ProcedureRegistry::new();
        registry.add(definition("users.list"));

        assert_eq!(registry.get(Some("users.list")).len(), 1);
        assert_eq!(registry.get(Some("/users.list/")).len(), 1);
        assert!(registry.get(Some("users.get")).is_empty());
        assert_eq!(registry.get(None).len(), 1);
    }

    #[test]
    fn test_ensure_compiled_fails_fast() {
        let mut registry = ProcedureRegistry::new();
        registry.add(definition("ok.{a}"));
        registry.add(definition("bad.{a?}.{b}"));

        assert!(registry.ensure_compiled().is_err());
    }

    #[test]
    fn test_group_stack_merges_nested() {
        let mut registry = ProcedureRegistry::new();
        registry.push_group(GroupAttributes::new().prefix("api").middleware(["log"]));
        registry.push_group(GroupAttributes::new().prefix("v1").middleware(["auth"]));

        let current = registry.current_group().unwrap();
        assert_eq!(current.prefix.as_deref(), Some("api/v1"));
        assert_eq!(current.middleware, vec!["log", "auth"]);

        registry.pop_group();
        assert_eq!(
            registry.current_group().unwrap().prefix.as_deref(),
            Some("api")
        );
        registry.pop_group();
        assert!(!registry.has_group_stack());
    }
}
