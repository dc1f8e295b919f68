/// Identifier (and display name) of the single root connection group
pub const ROOT_CONNECTION_GROUP: &str = "ROOT";

/// Only catalog instances carrying this tag become connections
pub const CONNECTION_TAG: &str = "guacamole";

/// Identifier of the authentication provider backed by the catalog
pub const PROVIDER_IDENTIFIER: &str = "consulio";

/// Service metadata key that selects the connection protocol
pub const META_PROTOCOL: &str = "protocol";

/// Connection parameter keys injected from the service instance
pub const PARAM_HOSTNAME: &str = "hostname";
pub const PARAM_PORT: &str = "port";

/// Header carrying the registry ACL token
pub const CONSUL_TOKEN_HEADER: &str = "X-Consul-Token";

/// API path prefix
pub const API_PREFIX: &str = "/v1";
