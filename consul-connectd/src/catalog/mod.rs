//! Call surface over the service registry's catalog.
//!
//! The directory only ever talks to a [`CatalogClient`]; [`consul::ConsulClient`]
//! is the HTTP implementation used in production.

pub mod consul;
#[cfg(test)]
pub mod memory;

use std::collections::BTreeSet;
use async_trait::async_trait;
use thiserror::Error;
use shared::types::ServiceInstance;

pub use consul::ConsulClient;

/// Catalog-level failures. Either one is fatal to a session's directory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Registry unreachable: {0}")]
    Unreachable(String),

    #[error("Registry protocol error: {0}")]
    Protocol(String),
}

/// Read-only view of a service catalog. No retries happen at this layer.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Every service name known to the registry, regardless of tag
    async fn list_service_names(&self) -> Result<BTreeSet<String>, CatalogError>;

    /// All instances of `name` carrying `tag`; empty if there are none
    async fn list_instances(
        &self,
        name: &str,
        tag: &str,
    ) -> Result<Vec<ServiceInstance>, CatalogError>;
}
