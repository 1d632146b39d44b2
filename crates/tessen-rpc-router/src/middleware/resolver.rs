//! Middleware name resolution, deduplication and priority ordering.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::RpcMiddleware;

/// Faults raised while resolving middleware names into instances.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown middleware '{0}'")]
    UnknownName(String),

    #[error("middleware group '{0}' is self-referential")]
    GroupCycle(String),
}

/// A middleware instance paired with the name it resolved from.
#[derive(Clone)]
pub struct ResolvedMiddleware {
    pub name: String,
    pub instance: Arc<dyn RpcMiddleware>,
}

impl std::fmt::Debug for ResolvedMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Name-keyed middleware configuration, injected at router construction.
///
/// Holds the alias table (`name → instance`), group aliases expanding to
/// member lists (groups may reference other groups), and the priority list
/// that forces listed middleware into a fixed relative order.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    aliases: HashMap<String, Arc<dyn RpcMiddleware>>,
    groups: HashMap<String, Vec<String>>,
    priority: Vec<String>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a middleware instance under a short-hand name.
    pub fn register(&mut self, name: impl Into<String>, instance: Arc<dyn RpcMiddleware>) {
        self.aliases.insert(name.into(), instance);
    }

    /// Register a group alias expanding to a list of member names.
    pub fn register_group<I, S>(&mut self, name: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .insert(name.into(), members.into_iter().map(Into::into).collect());
    }

    /// Set the priority-sorted list of middleware names. Listed middleware
    /// always execute in this relative order; unlisted middleware keep their
    /// gathered order around the anchors.
    pub fn set_priority<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority = names.into_iter().map(Into::into).collect();
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.groups.is_empty()
    }

    /// Expand group aliases recursively into leaf names.
    fn expand(&self, name: &str, stack: &mut Vec<String>, out: &mut Vec<String>)
    -> Result<(), ResolveError> {
        if let Some(members) = self.groups.get(name) {
            if stack.iter().any(|seen| seen == name) {
                return Err(ResolveError::GroupCycle(name.to_string()));
            }
            stack.push(name.to_string());
            for member in members {
                self.expand(member, stack, out)?;
            }
            stack.pop();
            Ok(())
        } else {
            out.push(name.to_string());
            Ok(())
        }
    }

    /// Resolve gathered middleware names into an ordered, deduplicated chain.
    ///
    /// Group aliases are expanded, exclusions are removed (by name, or via
    /// the instance's [`RpcMiddleware::excluded_by`] family hook), duplicates
    /// collapse to their first occurrence, and the priority list is applied
    /// last.
    pub fn resolve(
        &self,
        names: &[String],
        excluded: &[String],
    ) -> Result<Vec<ResolvedMiddleware>, ResolveError> {
        let mut excluded_flat = Vec::new();
        for name in excluded {
            // An unknown excluded name is kept literally: excluding something
            // that is not registered excludes nothing but is not a fault.
            let mut stack = Vec::new();
            self.expand(name, &mut stack, &mut excluded_flat)?;
        }

        let mut flat = Vec::new();
        for name in names {
            let mut stack = Vec::new();
            self.expand(name, &mut stack, &mut flat)?;
        }

        let mut resolved = Vec::new();
        for name in flat {
            let instance = self
                .aliases
                .get(&name)
                .cloned()
                .ok_or_else(|| ResolveError::UnknownName(name.clone()))?;

            let is_excluded = excluded_flat
                .iter()
                .any(|ex| ex == &name || instance.excluded_by(ex));
            if !is_excluded {
                resolved.push(ResolvedMiddleware { name, instance });
            }
        }

        Ok(self.sort_by_priority(Self::unique_middleware(resolved)))
    }

    /// Deduplicate, preserving first-occurrence order. Two aliases bound to
    /// the same instance count as duplicates too.
    pub fn unique_middleware(list: Vec<ResolvedMiddleware>) -> Vec<ResolvedMiddleware> {
        let mut seen_names: Vec<String> = Vec::new();
        let mut seen_instances: Vec<*const ()> = Vec::new();
        let mut unique = Vec::new();

        for item in list {
            let ptr = Arc::as_ptr(&item.instance) as *const ();
            if seen_names.iter().any(|name| name == &item.name)
                || seen_instances.contains(&ptr)
            {
                continue;
            }
            seen_names.push(item.name.clone());
            seen_instances.push(ptr);
            unique.push(item);
        }

        unique
    }

    /// Reorder prioritized middleware into priority order within the slots
    /// they occupy; unlisted middleware keep their exact positions.
    fn sort_by_priority(&self, list: Vec<ResolvedMiddleware>) -> Vec<ResolvedMiddleware> {
        if self.priority.is_empty() {
            return list;
        }

        let priority_index =
            |name: &str| self.priority.iter().position(|entry| entry == name);

        let slots: Vec<usize> = list
            .iter()
            .enumerate()
            .filter(|(_, item)| priority_index(&item.name).is_some())
            .map(|(index, _)| index)
            .collect();

        let mut anchored: Vec<ResolvedMiddleware> =
            slots.iter().map(|&index| list[index].clone()).collect();
        anchored.sort_by_key(|item| priority_index(&item.name).unwrap());

        let mut result = list;
        for (&slot, item) in slots.iter().zip(anchored) {
            result[slot] = item;
        }
        result
    }
}
