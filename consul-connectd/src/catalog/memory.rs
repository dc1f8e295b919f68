use std::collections::{BTreeMap, BTreeSet};
use async_trait::async_trait;
use shared::types::ServiceInstance;
use super::{CatalogClient, CatalogError};

/// In-memory catalog for exercising the directory without a registry
#[derive(Default, Clone)]
pub struct MemoryCatalog {
    services: BTreeMap<String, Vec<(Vec<String>, ServiceInstance)>>,
    unreachable: bool,
    broken_service: Option<String>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `instance` under catalog entry `service` with the given tags
    pub fn with_instance(mut self, service: &str, tags: &[&str], instance: ServiceInstance) -> Self {
        let tags = tags.iter().map(|t| t.to_string()).collect();
        self.services
            .entry(service.to_string())
            .or_default()
            .push((tags, instance));
        self
    }

    /// Register a catalog entry with no instances
    pub fn with_service(mut self, service: &str) -> Self {
        self.services.entry(service.to_string()).or_default();
        self
    }

    /// Fail every call as if the registry could not be contacted
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Fail instance listing for one service with a malformed response
    pub fn broken_service(mut self, service: &str) -> Self {
        self.broken_service = Some(service.to_string());
        self
    }
}

#[async_trait]
impl CatalogClient for MemoryCatalog {
    async fn list_service_names(&self) -> Result<BTreeSet<String>, CatalogError> {
        if self.unreachable {
            return Err(CatalogError::Unreachable("connection refused".to_string()));
        }
        Ok(self.services.keys().cloned().collect())
    }

    async fn list_instances(
        &self,
        name: &str,
        tag: &str,
    ) -> Result<Vec<ServiceInstance>, CatalogError> {
        if self.unreachable {
            return Err(CatalogError::Unreachable("connection refused".to_string()));
        }
        if self.broken_service.as_deref() == Some(name) {
            return Err(CatalogError::Protocol(format!("malformed response for {}", name)));
        }

        Ok(self
            .services
            .get(name)
            .into_iter()
            .flatten()
            .filter(|(tags, _)| tags.iter().any(|t| t == tag))
            .map(|(_, instance)| instance.clone())
            .collect())
    }
}

/// Build a service instance from literal parts
pub fn instance(name: &str, address: &str, port: i64, meta: &[(&str, &str)]) -> ServiceInstance {
    ServiceInstance {
        name: name.to_string(),
        address: address.to_string(),
        port,
        meta: meta
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}
