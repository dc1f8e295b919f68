use std::collections::{BTreeSet, HashMap};
use std::fmt;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use shared::protocol::CONNECTION_TAG;
use shared::types::Connection;
use crate::catalog::{CatalogClient, CatalogError};
use super::fingerprint::compute_fingerprint;
use super::mapper::map_instance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

impl fmt::Display for DirectoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DirectoryState::Uninitialized => "uninitialized",
            DirectoryState::Initializing => "initializing",
            DirectoryState::Ready => "ready",
            DirectoryState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Connection directory is {0}, not ready")]
    NotReady(DirectoryState),

    #[error("Connection directory is already {0}")]
    AlreadyInitialized(DirectoryState),

    #[error("Unable to connect to the service catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Session-scoped set of connections discovered from the catalog.
///
/// Filled once by [`ConnectionDirectory::initialize`] and read-only after
/// that. A failed initialization leaves the directory empty.
#[derive(Debug)]
pub struct ConnectionDirectory {
    state: DirectoryState,
    connections: HashMap<String, Connection>,
    initialized_at: Option<DateTime<Utc>>,
}

impl Default for ConnectionDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionDirectory {
    pub fn new() -> Self {
        Self {
            state: DirectoryState::Uninitialized,
            connections: HashMap::new(),
            initialized_at: None,
        }
    }

    pub fn state(&self) -> DirectoryState {
        self.state
    }

    /// When the catalog snapshot completed, if it did
    pub fn initialized_at(&self) -> Option<DateTime<Utc>> {
        self.initialized_at
    }

    /// Walk the catalog and populate the directory.
    ///
    /// Any catalog failure discards everything gathered so far and leaves
    /// the directory `Failed`. Instances that fail validation are skipped.
    pub async fn initialize(&mut self, catalog: &dyn CatalogClient) -> Result<(), DirectoryError> {
        if self.state != DirectoryState::Uninitialized {
            return Err(DirectoryError::AlreadyInitialized(self.state));
        }
        self.state = DirectoryState::Initializing;

        match load_connections(catalog).await {
            Ok(connections) => {
                info!("Loaded {} connections from service catalog", connections.len());
                self.connections = connections;
                self.initialized_at = Some(Utc::now());
                self.state = DirectoryState::Ready;
                Ok(())
            }
            Err(e) => {
                error!("Service catalog query failed: {}", e);
                self.state = DirectoryState::Failed;
                Err(e.into())
            }
        }
    }

    /// Look up one connection. `Ok(None)` means it is simply not there.
    pub fn get(&self, identifier: &str) -> Result<Option<&Connection>, DirectoryError> {
        self.ensure_ready()?;
        Ok(self.connections.get(identifier))
    }

    /// Look up several connections, silently skipping unknown identifiers
    pub fn get_all<I, S>(&self, identifiers: I) -> Result<Vec<&Connection>, DirectoryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_ready()?;
        Ok(identifiers
            .into_iter()
            .filter_map(|id| self.connections.get(id.as_ref()))
            .collect())
    }

    /// Snapshot of the identifiers currently held
    pub fn get_identifiers(&self) -> BTreeSet<String> {
        self.connections.keys().cloned().collect()
    }

    /// All connections, sorted by identifier
    pub fn connections(&self) -> Vec<&Connection> {
        let mut connections: Vec<&Connection> = self.connections.values().collect();
        connections.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        connections
    }

    pub fn fingerprint(&self) -> String {
        compute_fingerprint(self.connections.values())
    }

    fn ensure_ready(&self) -> Result<(), DirectoryError> {
        match self.state {
            DirectoryState::Ready => Ok(()),
            other => Err(DirectoryError::NotReady(other)),
        }
    }
}

async fn load_connections(
    catalog: &dyn CatalogClient,
) -> Result<HashMap<String, Connection>, CatalogError> {
    let names = catalog.list_service_names().await?;
    debug!("Service catalog lists {} services", names.len());

    let mut connections = HashMap::new();
    for name in &names {
        let instances = catalog.list_instances(name, CONNECTION_TAG).await?;
        debug!("Service {} has {} instances tagged {}", name, instances.len(), CONNECTION_TAG);

        for instance in instances {
            let service = instance.name.clone();
            match map_instance(instance) {
                Ok(connection) => {
                    // Names are expected unique; the last one seen wins
                    if connections.insert(connection.identifier.clone(), connection).is_some() {
                        warn!("Duplicate service {}, replacing earlier definition", service);
                    }
                }
                Err(reason) => {
                    warn!("Skipping service {}: {}", service, reason);
                }
            }
        }
    }

    Ok(connections)
}
