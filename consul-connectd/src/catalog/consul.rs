use std::collections::{BTreeMap, BTreeSet, HashMap};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use shared::protocol::CONSUL_TOKEN_HEADER;
use shared::types::ServiceInstance;
use crate::config::ConsulConfig;
use super::{CatalogClient, CatalogError};

/// Record returned by `/v1/catalog/service/{name}`. Only the fields
/// needed to build a connection are decoded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CatalogServiceRecord {
    service_name: String,
    #[serde(default)]
    service_address: Option<String>,
    #[serde(default)]
    service_port: i64,
    #[serde(default)]
    service_meta: Option<HashMap<String, String>>,
}

impl From<CatalogServiceRecord> for ServiceInstance {
    fn from(record: CatalogServiceRecord) -> Self {
        ServiceInstance {
            name: record.service_name,
            address: record.service_address.unwrap_or_default(),
            port: record.service_port,
            meta: record.service_meta.unwrap_or_default(),
        }
    }
}

/// Consul HTTP catalog client
pub struct ConsulClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ConsulClient {
    pub fn new(config: &ConsulConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url(),
            token: config.token.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let mut request = self.http.get(&url).query(query);
        if let Some(token) = &self.token {
            request = request.header(CONSUL_TOKEN_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Unreachable(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Protocol(format!("{} returned {}", url, status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Protocol(format!("Failed to decode {}: {}", url, e)))
    }
}

#[async_trait]
impl CatalogClient for ConsulClient {
    async fn list_service_names(&self) -> Result<BTreeSet<String>, CatalogError> {
        // Values are the tags of each service; only the names matter here
        let services: BTreeMap<String, Option<Vec<String>>> =
            self.get_json("/v1/catalog/services", &[]).await?;

        Ok(services.into_keys().collect())
    }

    async fn list_instances(
        &self,
        name: &str,
        tag: &str,
    ) -> Result<Vec<ServiceInstance>, CatalogError> {
        let path = format!("/v1/catalog/service/{}", urlencoding::encode(name));
        let records: Vec<CatalogServiceRecord> =
            self.get_json(&path, &[("tag", tag)]).await?;

        Ok(records.into_iter().map(ServiceInstance::from).collect())
    }
}
