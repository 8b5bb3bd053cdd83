/// Vocabulary and header constants shared across crates
pub const ACL_NAMESPACE: &str = "http://www.w3.org/ns/auth/acl#";
pub const FOAF_NAMESPACE: &str = "http://xmlns.com/foaf/0.1/";

pub const ACL_READ: &str = const_str::concat!(ACL_NAMESPACE, "Read");
pub const ACL_WRITE: &str = const_str::concat!(ACL_NAMESPACE, "Write");
pub const ACL_APPEND: &str = const_str::concat!(ACL_NAMESPACE, "Append");
pub const ACL_CONTROL: &str = const_str::concat!(ACL_NAMESPACE, "Control");

pub const ACL_AGENT: &str = const_str::concat!(ACL_NAMESPACE, "agent");
pub const ACL_AGENT_CLASS: &str = const_str::concat!(ACL_NAMESPACE, "agentClass");
pub const ACL_ORIGIN: &str = const_str::concat!(ACL_NAMESPACE, "origin");
pub const ACL_ACCESS_TO: &str = const_str::concat!(ACL_NAMESPACE, "accessTo");
pub const ACL_DEFAULT: &str = const_str::concat!(ACL_NAMESPACE, "default");
pub const ACL_MODE: &str = const_str::concat!(ACL_NAMESPACE, "mode");
pub const ACL_AUTHENTICATED_AGENT: &str = const_str::concat!(ACL_NAMESPACE, "AuthenticatedAgent");

pub const FOAF_AGENT: &str = const_str::concat!(FOAF_NAMESPACE, "Agent");

/// File name of a container's access control document.
pub const ACL_FILE_NAME: &str = ".acl";
/// Suffix that marks a resource as an access control document.
pub const ACL_SUFFIX: &str = ".acl";

pub const DPOP_HEADER: &str = "dpop";
pub const DPOP_AUTH_SCHEME: &str = "dpop";
pub const DPOP_PROOF_TYPE: &str = "dpop+jwt";
pub const WAC_ALLOW_HEADER: &str = "wac-allow";

/// Identifier reported for requests that carry no credentials.
pub const PUBLIC_IDENTITY: &str = "public";
