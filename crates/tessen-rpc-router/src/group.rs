//! Group attributes shared by a batch of procedure registrations.

use std::collections::HashMap;

use crate::pattern::trim_method;

/// Attributes a registration group applies to every definition registered
/// while it is on the stack: a method prefix, middleware names, `where`
/// constraints and an action namespace.
#[derive(Debug, Clone, Default)]
pub struct GroupAttributes {
    pub prefix: Option<String>,
    pub middleware: Vec<String>,
    pub wheres: HashMap<String, String>,
    pub namespace: Option<String>,
}

impl GroupAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn where_(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.wheres.insert(name.into(), pattern.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Merge `new` attributes into `old` (the attributes already on the
    /// stack). Prefixes concatenate with slash normalization: old before
    /// new when `prepend_existing_prefix`, new before old otherwise.
    /// Middleware lists concatenate outer-first; deduplication happens at
    /// dispatch time, not here. `where` maps union with the newer (closer to
    /// the route) constraint winning. Namespaces compose unless the new one
    /// is already absolute (`::`-prefixed).
    pub fn merge(new: &GroupAttributes, old: &GroupAttributes, prepend_existing_prefix: bool)
    -> GroupAttributes {
        let prefix = if prepend_existing_prefix {
            join_prefix(old.prefix.as_deref(), new.prefix.as_deref())
        } else {
            join_prefix(new.prefix.as_deref(), old.prefix.as_deref())
        };

        let mut middleware = old.middleware.clone();
        middleware.extend(new.middleware.iter().cloned());

        let mut wheres = old.wheres.clone();
        wheres.extend(new.wheres.iter().map(|(k, v)| (k.clone(), v.clone())));

        let namespace = match (&new.namespace, &old.namespace) {
            (Some(new_ns), Some(old_ns)) if !new_ns.starts_with("::") => {
                Some(format!("{}::{}", old_ns, new_ns))
            }
            (Some(new_ns), _) => Some(new_ns.trim_start_matches("::").to_string()),
            (None, old_ns) => old_ns.clone(),
        };

        GroupAttributes {
            prefix,
            middleware,
            wheres,
            namespace,
        }
    }
}

/// Concatenate two optional prefixes with slash normalization.
pub(crate) fn join_prefix(first: Option<&str>, second: Option<&str>) -> Option<String> {
    let first = first.map(trim_method).unwrap_or("");
    let second = second.map(trim_method).unwrap_or("");

    match (first.is_empty(), second.is_empty()) {
        (true, true) => None,
        (false, true) => Some(first.to_string()),
        (true, false) => Some(second.to_string()),
        (false, false) => Some(format!("{}/{}", first, second)),
    }
}

/// Prefix a method string with a group prefix, slash-normalized.
pub(crate) fn apply_prefix(prefix: Option<&str>, method: &str) -> String {
    match join_prefix(prefix, Some(method)) {
        Some(full) => full,
        None => String::new(),
    }
}
