use std::collections::BTreeMap;
use serde::Serialize;
use sha2::{Sha256, Digest};
use shared::types::Connection;

/// Stable view of a connection: parameters are ordered so that the
/// unordered map inside a connection hashes the same every time.
#[derive(Serialize)]
struct HashView<'a> {
    identifier: &'a str,
    parent_identifier: &'a str,
    protocol: &'a str,
    parameters: BTreeMap<&'a str, &'a str>,
}

/// Computes a SHA-256 hash of a connection set.
/// Connections are sorted by identifier for deterministic output.
pub fn compute_fingerprint<'a>(connections: impl IntoIterator<Item = &'a Connection>) -> String {
    let mut views: Vec<HashView<'_>> = connections
        .into_iter()
        .map(|c| HashView {
            identifier: &c.identifier,
            parent_identifier: &c.parent_identifier,
            protocol: &c.configuration.protocol,
            parameters: c
                .configuration
                .parameters
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect(),
        })
        .collect();
    views.sort_by(|a, b| a.identifier.cmp(b.identifier));

    let json = serde_json::to_string(&views)
        .expect("Failed to serialize connections for fingerprinting");

    let hash = Sha256::digest(json.as_bytes());
    hex::encode(hash)
}
