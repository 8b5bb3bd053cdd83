//! Normalized resource paths inside a Pod.
//!
//! A path is kept as a list of segments plus a container flag instead of a
//! string, so walking towards the root is a matter of truncating the segment
//! list rather than string surgery.

use kura_core::constants::{ACL_FILE_NAME, ACL_SUFFIX};

/// A normalized, absolute path of a resource or container.
///
/// ## Examples
///
/// - `/` -> root container (no segments)
/// - `/alice/notes/` -> `["alice", "notes"]`, container
/// - `/alice/notes/today.ttl` -> `["alice", "notes", "today.ttl"]`, document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePath {
    segments: Vec<String>,
    container: bool,
}

impl ResourcePath {
    /// The root container.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
            container: true,
        }
    }

    /// Parses a `/`-separated path.
    ///
    /// Empty and `.` segments are dropped and `..` removes the previous
    /// segment (never above the root). A trailing `/` marks a container.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let mut segments: Vec<String> = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other.to_string()),
            }
        }

        let container = segments.is_empty()
            || path.ends_with('/')
            || path.ends_with("/.")
            || path.ends_with("/..");

        Self {
            segments,
            container,
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub const fn is_container(&self) -> bool {
        self.container
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the last segment, or `None` for the root.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns `true` for access control documents (paths ending in `.acl`).
    #[must_use]
    pub fn is_acl(&self) -> bool {
        !self.container && self.name().is_some_and(|name| name.ends_with(ACL_SUFFIX))
    }

    /// The container holding this resource. The root is its own parent.
    #[must_use]
    pub fn parent(&self) -> Self {
        self.ancestor(self.segments.len().saturating_sub(1))
    }

    /// Containers above this resource, nearest first, ending with the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (0..self.segments.len()).rev().map(|depth| self.ancestor(depth))
    }

    /// The container made of the first `depth` segments.
    fn ancestor(&self, depth: usize) -> Self {
        Self {
            segments: self.segments[..depth.min(self.segments.len())].to_vec(),
            container: true,
        }
    }

    /// A document named `name` inside this container.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self {
            segments,
            container: false,
        }
    }

    /// A container named `name` inside this container.
    #[must_use]
    pub fn child_container(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self {
            segments,
            container: true,
        }
    }

    /// The `.acl` document of this container.
    #[must_use]
    pub fn container_acl(&self) -> Self {
        self.child(ACL_FILE_NAME)
    }

    /// Returns `true` if `other` lives strictly below this container.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.container
            && other.segments.len() > self.segments.len()
            && other.segments.starts_with(&self.segments)
    }
}

impl std::fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("/")?;
        f.write_str(&self.segments.join("/"))?;
        if self.container && !self.segments.is_empty() {
            f.write_str("/")?;
        }
        Ok(())
    }
}
