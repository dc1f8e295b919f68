use std::collections::{BTreeSet, HashMap};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// One instance of a service as returned by the registry catalog.
/// Produced fresh on every catalog query and consumed by the mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Service name, e.g. "rdp1"
    pub name: String,

    /// Network address the service is reachable on (may be empty)
    pub address: String,

    /// Service port. Registries accept anything here, so range is checked later.
    pub port: i64,

    /// Free-form service metadata
    pub meta: HashMap<String, String>,
}

/// Protocol plus the parameters handed to the remote-access gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub protocol: String,
    pub parameters: HashMap<String, String>,
}

/// A connection definition derived from a service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique within a session, equal to the service name
    pub identifier: String,

    /// Display name, equal to the identifier
    pub name: String,

    /// Always the root group
    pub parent_identifier: String,

    pub configuration: ConnectionConfig,
}

/// A group of connections. Sessions only ever have the root one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionGroup {
    pub identifier: String,
    pub name: String,
    pub connection_identifiers: BTreeSet<String>,
    pub child_group_identifiers: BTreeSet<String>,
}

/// Object permissions granted to a session's user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    pub connections: BTreeSet<String>,
    pub connection_groups: BTreeSet<String>,
}

/// Everything a host needs to render one user's available connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContextSnapshot {
    /// Identifier of the provider that built this context
    pub provider: String,

    /// The authenticated user the context belongs to
    pub user: String,

    pub root_group: ConnectionGroup,

    /// Connections sorted by identifier
    pub connections: Vec<Connection>,

    pub permissions: PermissionSnapshot,

    /// SHA-256 over the sorted connections; equal catalogs give equal values
    pub fingerprint: String,

    /// When the catalog snapshot was taken
    pub taken_at: DateTime<Utc>,
}
