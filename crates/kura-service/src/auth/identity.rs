//! Request identity.
//!
//! A request is either anonymous or carries a verified WebID. The identity is
//! resolved once by the DPoP validator and then fed to the WAC engine.

use kura_core::constants::PUBLIC_IDENTITY;

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// No (or no usable) credentials were presented.
    Public,
    /// A verified agent, identified by its WebID IRI.
    Agent(String),
}

impl Identity {
    #[must_use]
    pub fn agent(web_id: impl Into<String>) -> Self {
        Self::Agent(web_id.into())
    }

    /// Returns the WebID for authenticated agents.
    #[must_use]
    pub fn web_id(&self) -> Option<&str> {
        match self {
            Self::Public => None,
            Self::Agent(web_id) => Some(web_id),
        }
    }

    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }

    /// Returns the WebID, or `public` for anonymous requests.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.web_id().unwrap_or(PUBLIC_IDENTITY)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
