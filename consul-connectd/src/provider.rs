use std::sync::Arc;
use tracing::info;
use shared::protocol::PROVIDER_IDENTIFIER;
use crate::catalog::{CatalogClient, ConsulClient};
use crate::config::ConsulConfig;
use crate::connection::{ConnectionDirectory, DirectoryError};
use crate::user::UserContext;

/// Authentication provider that reads connections from the service catalog.
/// Cheap to clone; every clone shares the same registry settings.
#[derive(Debug, Clone)]
pub struct ConsulAuthProvider {
    config: Arc<ConsulConfig>,
}

impl ConsulAuthProvider {
    pub fn new(config: ConsulConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn identifier(&self) -> &'static str {
        PROVIDER_IDENTIFIER
    }

    /// Build a context for an already authenticated user from a fresh
    /// catalog snapshot. A new registry client is used for every session.
    pub async fn get_user_context(&self, username: &str) -> Result<UserContext, DirectoryError> {
        let client = ConsulClient::new(&self.config);
        self.get_user_context_with(username, &client).await
    }

    /// Same as [`Self::get_user_context`], reading from `catalog`
    pub async fn get_user_context_with(
        &self,
        username: &str,
        catalog: &dyn CatalogClient,
    ) -> Result<UserContext, DirectoryError> {
        let mut directory = ConnectionDirectory::new();
        directory.initialize(catalog).await?;

        let context = UserContext::init(self.clone(), username, directory)?;
        info!(
            "Session for {} bound to {} connections",
            username,
            context.root_connection_group().connection_identifiers.len()
        );

        Ok(context)
    }
}
