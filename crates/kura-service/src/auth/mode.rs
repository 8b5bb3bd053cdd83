//! WAC access modes.
//!
//! Modes are identified in `.acl` documents by fixed IRIs in the
//! `http://www.w3.org/ns/auth/acl#` namespace and rendered lowercase in the
//! `WAC-Allow` response header.

use std::collections::BTreeSet;

use kura_core::constants::{ACL_APPEND, ACL_CONTROL, ACL_READ, ACL_WRITE};

/// An access mode that can be granted by an `acl:Authorization`.
///
/// The declaration order is the order modes are listed in `WAC-Allow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessMode {
    Read,
    Write,
    Append,
    Control,
}

/// A set of access modes.
pub type ModeSet = BTreeSet<AccessMode>;

impl AccessMode {
    pub const ALL: [Self; 4] = [Self::Read, Self::Write, Self::Append, Self::Control];

    /// Returns the IRI identifying this mode.
    #[must_use]
    pub const fn iri(self) -> &'static str {
        match self {
            Self::Read => ACL_READ,
            Self::Write => ACL_WRITE,
            Self::Append => ACL_APPEND,
            Self::Control => ACL_CONTROL,
        }
    }

    /// Parses a mode IRI. Matching is exact and case-sensitive.
    #[must_use]
    pub fn from_iri(iri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.iri() == iri)
    }

    /// Returns the lowercase name used in `WAC-Allow`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Append => "append",
            Self::Control => "control",
        }
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders modes as a space-separated lowercase list, e.g. `read write`.
#[must_use]
pub fn render_modes(modes: &ModeSet) -> String {
    modes
        .iter()
        .map(|mode| mode.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
