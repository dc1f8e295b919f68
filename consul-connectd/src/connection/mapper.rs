use thiserror::Error;
use shared::protocol::{META_PROTOCOL, PARAM_HOSTNAME, PARAM_PORT, ROOT_CONNECTION_GROUP};
use shared::types::{Connection, ConnectionConfig, ServiceInstance};

/// Why a service instance could not become a connection. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("hostname or address not specified")]
    MissingAddress,

    #[error("port {0} not specified or invalid")]
    InvalidPort(i64),

    #[error("protocol not specified")]
    MissingProtocol,
}

/// Convert a catalog instance into a connection under the root group.
///
/// Rules are checked in order (address, port, protocol) and the first
/// failure decides the rejection. The `protocol` metadata entry is consumed;
/// every other entry is forwarded as a parameter alongside `hostname` and
/// `port`, which overwrite any metadata of the same name.
pub fn map_instance(instance: ServiceInstance) -> Result<Connection, Rejection> {
    let ServiceInstance { name, address, port, mut meta } = instance;

    if address.is_empty() {
        return Err(Rejection::MissingAddress);
    }

    if !(1..=65535).contains(&port) {
        return Err(Rejection::InvalidPort(port));
    }

    let protocol = match meta.remove(META_PROTOCOL) {
        Some(protocol) if !protocol.is_empty() => protocol,
        _ => return Err(Rejection::MissingProtocol),
    };

    meta.insert(PARAM_HOSTNAME.to_string(), address);
    meta.insert(PARAM_PORT.to_string(), port.to_string());

    Ok(Connection {
        identifier: name.clone(),
        name,
        parent_identifier: ROOT_CONNECTION_GROUP.to_string(),
        configuration: ConnectionConfig {
            protocol,
            parameters: meta,
        },
    })
}
