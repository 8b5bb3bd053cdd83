//! Grant tables and requested grants.

use std::collections::{BTreeMap, BTreeSet};

use super::mode::{AccessMode, ModeSet};
use super::path::ResourcePath;

/// Modes granted to one identity category, keyed by target URL path.
///
/// `access_to` targets match a resource exactly. `default` targets are
/// containers whose descendants inherit the grant; they never match the
/// container itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantTable {
    access_to: BTreeMap<AccessMode, BTreeSet<String>>,
    default: BTreeMap<AccessMode, BTreeSet<String>>,
}

impl GrantTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_access_to(&mut self, mode: AccessMode, target: impl Into<String>) {
        self.access_to.entry(mode).or_default().insert(target.into());
    }

    pub fn grant_default(&mut self, mode: AccessMode, target: impl Into<String>) {
        self.default.entry(mode).or_default().insert(target.into());
    }

    /// Adds every grant of `other` to this table.
    pub fn merge(&mut self, other: &Self) {
        for (mode, targets) in &other.access_to {
            self.access_to
                .entry(*mode)
                .or_default()
                .extend(targets.iter().cloned());
        }
        for (mode, targets) in &other.default {
            self.default
                .entry(*mode)
                .or_default()
                .extend(targets.iter().cloned());
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_to.is_empty() && self.default.is_empty()
    }

    /// Returns `true` if `mode` is granted on `uri_path`.
    #[must_use]
    pub fn allows(&self, mode: AccessMode, uri_path: &str) -> bool {
        let exact = self
            .access_to
            .get(&mode)
            .is_some_and(|targets| targets.contains(uri_path));
        if exact {
            return true;
        }

        let Some(defaults) = self.default.get(&mode) else {
            return false;
        };
        let resource = ResourcePath::parse(uri_path);
        defaults.iter().any(|target| {
            target.ends_with('/') && ResourcePath::parse(target).is_ancestor_of(&resource)
        })
    }

    /// Returns `true` if any of `modes` is granted on `uri_path`.
    ///
    /// An empty mode set is trivially satisfied.
    #[must_use]
    pub fn satisfies(&self, modes: &ModeSet, uri_path: &str) -> bool {
        modes.is_empty() || modes.iter().any(|mode| self.allows(*mode, uri_path))
    }

    /// All modes granted on `uri_path`.
    #[must_use]
    pub fn effective_modes(&self, uri_path: &str) -> ModeSet {
        AccessMode::ALL
            .into_iter()
            .filter(|mode| self.allows(*mode, uri_path))
            .collect()
    }
}

/// Which resource a requested grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantScope {
    /// The request target itself.
    Resource,
    /// The nearest existing container above the request target.
    Parent,
}

/// One required grant: any of `modes` on `scope`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedGrant {
    pub scope: GrantScope,
    pub modes: ModeSet,
}

impl RequestedGrant {
    #[must_use]
    pub fn new(scope: GrantScope, modes: impl IntoIterator<Item = AccessMode>) -> Self {
        Self {
            scope,
            modes: modes.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn resource(modes: impl IntoIterator<Item = AccessMode>) -> Self {
        Self::new(GrantScope::Resource, modes)
    }

    #[must_use]
    pub fn parent(modes: impl IntoIterator<Item = AccessMode>) -> Self {
        Self::new(GrantScope::Parent, modes)
    }
}
