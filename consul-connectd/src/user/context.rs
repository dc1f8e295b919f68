use std::collections::BTreeSet;
use shared::protocol::ROOT_CONNECTION_GROUP;
use shared::types::{ConnectionGroup, PermissionSnapshot, UserContextSnapshot};
use crate::connection::{ConnectionDirectory, DirectoryError, DirectoryState};
use crate::provider::ConsulAuthProvider;

/// Object permissions held by a user
pub trait ObjectPermissions {
    /// Identifiers of the connections the user may use
    fn connection_permissions(&self) -> BTreeSet<String>;

    /// Identifiers of the connection groups the user may see
    fn connection_group_permissions(&self) -> BTreeSet<String>;
}

/// The user a context belongs to. Permissions are read from the session's
/// directory and root group on every call rather than stored.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser<'a> {
    identifier: &'a str,
    directory: &'a ConnectionDirectory,
    root_group: &'a ConnectionGroup,
}

impl SessionUser<'_> {
    pub fn identifier(&self) -> &str {
        self.identifier
    }
}

impl ObjectPermissions for SessionUser<'_> {
    fn connection_permissions(&self) -> BTreeSet<String> {
        self.directory.get_identifiers()
    }

    fn connection_group_permissions(&self) -> BTreeSet<String> {
        BTreeSet::from([self.root_group.identifier.clone()])
    }
}

/// One authenticated user's view of the discovered connections.
///
/// Owns the session's directory and root group; everything is read-only
/// once [`UserContext::init`] returns.
#[derive(Debug)]
pub struct UserContext {
    provider: ConsulAuthProvider,
    username: String,
    directory: ConnectionDirectory,
    root_group: ConnectionGroup,
}

impl UserContext {
    /// Bind `username` to a ready directory. The root group captures the
    /// directory's identifiers as they are right now.
    pub fn init(
        provider: ConsulAuthProvider,
        username: impl Into<String>,
        directory: ConnectionDirectory,
    ) -> Result<Self, DirectoryError> {
        if directory.state() != DirectoryState::Ready {
            return Err(DirectoryError::NotReady(directory.state()));
        }

        let root_group = ConnectionGroup {
            identifier: ROOT_CONNECTION_GROUP.to_string(),
            name: ROOT_CONNECTION_GROUP.to_string(),
            connection_identifiers: directory.get_identifiers(),
            child_group_identifiers: BTreeSet::new(),
        };

        Ok(Self {
            provider,
            username: username.into(),
            directory,
            root_group,
        })
    }

    pub fn authentication_provider(&self) -> &ConsulAuthProvider {
        &self.provider
    }

    pub fn user(&self) -> SessionUser<'_> {
        SessionUser {
            identifier: &self.username,
            directory: &self.directory,
            root_group: &self.root_group,
        }
    }

    pub fn connection_directory(&self) -> &ConnectionDirectory {
        &self.directory
    }

    pub fn root_connection_group(&self) -> &ConnectionGroup {
        &self.root_group
    }

    /// Owned, serializable copy of everything the host renders
    pub fn snapshot(&self) -> UserContextSnapshot {
        let user = self.user();

        UserContextSnapshot {
            provider: self.authentication_provider().identifier().to_string(),
            user: user.identifier().to_string(),
            root_group: self.root_group.clone(),
            connections: self.directory.connections().into_iter().cloned().collect(),
            permissions: PermissionSnapshot {
                connections: user.connection_permissions(),
                connection_groups: user.connection_group_permissions(),
            },
            fingerprint: self.directory.fingerprint(),
            taken_at: self.directory.initialized_at().unwrap_or_else(chrono::Utc::now),
        }
    }
}
