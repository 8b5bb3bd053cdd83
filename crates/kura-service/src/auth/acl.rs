//! Parsing of `.acl` documents into authorizations.
//!
//! An `.acl` document is Turtle. Each RDF subject carrying WAC predicates is
//! one [`Authorization`]; `rdf:type acl:Authorization` is not required.

use kura_core::constants::{
    ACL_ACCESS_TO, ACL_AGENT, ACL_AGENT_CLASS, ACL_AUTHENTICATED_AGENT, ACL_DEFAULT, ACL_MODE,
    ACL_ORIGIN, FOAF_AGENT,
};
use oxrdf::Term;
use oxttl::TurtleParser;
use url::{Origin, Url};

use super::grant::GrantTable;
use super::mode::{AccessMode, ModeSet};
use crate::error::{ServiceError, ServiceResult};

/// One rule of an access control document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authorization {
    pub subject: String,
    pub agent_classes: Vec<String>,
    pub agents: Vec<String>,
    pub origins: Vec<String>,
    pub access_to: Vec<String>,
    pub defaults: Vec<String>,
    pub modes: ModeSet,
}

impl Authorization {
    fn new(subject: String) -> Self {
        Self {
            subject,
            ..Self::default()
        }
    }

    /// Grants to everyone, authenticated or not.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.agent_classes.iter().any(|class| class == FOAF_AGENT)
    }

    /// Grants to any authenticated agent.
    #[must_use]
    pub fn is_for_authenticated(&self) -> bool {
        self.agent_classes
            .iter()
            .any(|class| class == ACL_AUTHENTICATED_AGENT)
    }

    #[must_use]
    pub fn is_for_agent(&self, web_id: &str) -> bool {
        self.agents.iter().any(|agent| agent == web_id)
    }

    #[must_use]
    pub fn is_for_origin(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.origins
            .iter()
            .any(|granted| granted.trim_end_matches('/') == origin)
    }

    /// Adds this authorization's targets on `origin` to `table`.
    ///
    /// Targets are stored as URL paths. IRIs that are not URLs or point at
    /// another origin are skipped.
    pub fn grant_into(&self, origin: &Origin, table: &mut GrantTable) {
        for mode in &self.modes {
            for target in self.access_to.iter().filter_map(|iri| url_path(iri, origin)) {
                table.grant_access_to(*mode, target);
            }
            for target in self.defaults.iter().filter_map(|iri| url_path(iri, origin)) {
                table.grant_default(*mode, target);
            }
        }
    }
}

fn url_path(iri: &str, origin: &Origin) -> Option<String> {
    match Url::parse(iri) {
        Ok(url) if url.origin() == *origin => Some(url.path().to_string()),
        Ok(_) => {
            tracing::debug!(iri, "Skipping grant target on another origin");
            None
        }
        Err(error) => {
            tracing::trace!(iri, %error, "Skipping non-URL grant target");
            None
        }
    }
}

/// A parsed access control document.
///
/// Only targets on the origin of the document's base IRI are granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclDocument {
    origin: Origin,
    authorizations: Vec<Authorization>,
}

impl AclDocument {
    /// ## Summary
    /// Parses Turtle `bytes` read from the `.acl` at `path`, resolving
    /// relative IRIs against `base_iri`.
    ///
    /// ## Errors
    /// Returns [`ServiceError::AclParse`] if the document is not valid Turtle
    /// or `base_iri` is not an absolute URL.
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn parse(bytes: &[u8], base_iri: &str, path: &str) -> ServiceResult<Self> {
        let parse_error = |message: String| ServiceError::AclParse {
            path: path.to_string(),
            message,
        };

        let origin = Url::parse(base_iri)
            .map_err(|error| parse_error(format!("base IRI `{base_iri}`: {error}")))?
            .origin();
        let parser = TurtleParser::new()
            .with_base_iri(base_iri)
            .map_err(|error| parse_error(error.to_string()))?;

        let mut authorizations: Vec<Authorization> = Vec::new();
        for triple in parser.for_reader(bytes) {
            let triple = triple.map_err(|error| parse_error(error.to_string()))?;

            let predicate = triple.predicate.as_str();
            let is_wac_predicate = [
                ACL_AGENT_CLASS,
                ACL_AGENT,
                ACL_ORIGIN,
                ACL_ACCESS_TO,
                ACL_DEFAULT,
                ACL_MODE,
            ]
            .contains(&predicate);
            if !is_wac_predicate {
                continue;
            }
            let Term::NamedNode(object) = &triple.object else {
                tracing::trace!(%triple, "Ignoring WAC statement with a non-IRI object");
                continue;
            };
            let object = object.as_str();

            let subject = triple.subject.to_string();
            let index = match authorizations
                .iter()
                .position(|authorization| authorization.subject == subject)
            {
                Some(index) => index,
                None => {
                    authorizations.push(Authorization::new(subject));
                    authorizations.len() - 1
                }
            };
            let authorization = &mut authorizations[index];

            match predicate {
                ACL_AGENT_CLASS => authorization.agent_classes.push(object.to_string()),
                ACL_AGENT => authorization.agents.push(object.to_string()),
                ACL_ORIGIN => authorization.origins.push(object.to_string()),
                ACL_ACCESS_TO => authorization.access_to.push(object.to_string()),
                ACL_DEFAULT => authorization.defaults.push(object.to_string()),
                _ => {
                    if let Some(mode) = AccessMode::from_iri(object) {
                        authorization.modes.insert(mode);
                    } else {
                        tracing::trace!(mode = object, "Ignoring unknown access mode");
                    }
                }
            }
        }

        tracing::debug!(count = authorizations.len(), "Parsed ACL document");
        Ok(Self {
            origin,
            authorizations,
        })
    }

    #[must_use]
    pub fn authorizations(&self) -> &[Authorization] {
        &self.authorizations
    }

    /// Builds the grant table of all authorizations accepted by `applies`.
    pub fn grants_where(&self, applies: impl Fn(&Authorization) -> bool) -> GrantTable {
        let mut table = GrantTable::new();
        for authorization in self.authorizations.iter().filter(|a| applies(a)) {
            authorization.grant_into(&self.origin, &mut table);
        }
        table
    }
}
