use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::protocol::API_PREFIX;
use shared::types::{Connection, UserContextSnapshot};
use crate::provider::ConsulAuthProvider;
use crate::user::UserContext;

#[derive(Clone)]
pub struct AppState {
    pub provider: ConsulAuthProvider,
}

#[derive(Serialize)]
pub struct ProviderResponse {
    pub identifier: String,
}

#[derive(Deserialize)]
pub struct ConnectionQuery {
    /// Comma-separated connection identifiers; all connections when absent
    pub ids: Option<String>,
}

/// Every request that touches connections opens its own session, so each
/// response reflects a fresh catalog snapshot.
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/provider", get(get_provider))
        .route("/users/:username/context", get(get_context))
        .route("/users/:username/connections", get(get_connections))
        .route("/users/:username/connections/:identifier", get(get_connection));

    Router::new()
        .nest(API_PREFIX, routes)
        .with_state(state)
}

async fn open_session(state: &AppState, username: &str) -> Result<UserContext, StatusCode> {
    state
        .provider
        .get_user_context(username)
        .await
        .map_err(|e| {
            tracing::error!("Failed to start session for {}: {}", username, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn get_provider(State(state): State<AppState>) -> Json<ProviderResponse> {
    Json(ProviderResponse {
        identifier: state.provider.identifier().to_string(),
    })
}

async fn get_context(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserContextSnapshot>, StatusCode> {
    let context = open_session(&state, &username).await?;
    Ok(Json(context.snapshot()))
}

async fn get_connections(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<ConnectionQuery>,
) -> Result<Json<Vec<Connection>>, StatusCode> {
    let context = open_session(&state, &username).await?;
    let directory = context.connection_directory();

    let connections = match params.ids {
        Some(ids) => directory.get_all(ids.split(',').map(str::trim)),
        None => Ok(directory.connections()),
    };

    connections
        .map(|found| Json(found.into_iter().cloned().collect()))
        .map_err(|e| {
            tracing::error!("Failed to list connections: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn get_connection(
    State(state): State<AppState>,
    Path((username, identifier)): Path<(String, String)>,
) -> Result<Json<Connection>, StatusCode> {
    let context = open_session(&state, &username).await?;

    context
        .connection_directory()
        .get(&identifier)
        .map_err(|e| {
            tracing::error!("Failed to query connection: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsulConfig;
    use serde_json::{json, Value};

    async fn serve(router: Router) -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        port
    }

    /// Minimal registry: "rdp1" and "ssh1" are tagged, "broken" has a bad port
    fn registry_stub() -> Router {
        Router::new()
            .route(
                "/v1/catalog/services",
                get(|| async {
                    Json(json!({
                        "consul": [],
                        "rdp1": ["guacamole"],
                        "ssh1": ["guacamole"],
                        "broken": ["guacamole"],
                    }))
                }),
            )
            .route(
                "/v1/catalog/service/:name",
                get(|Path(name): Path<String>| async move {
                    let record = match name.as_str() {
                        "rdp1" => json!({
                            "ServiceName": "rdp1",
                            "ServiceAddress": "10.0.0.5",
                            "ServicePort": 3389,
                            "ServiceMeta": { "protocol": "rdp" }
                        }),
                        "ssh1" => json!({
                            "ServiceName": "ssh1",
                            "ServiceAddress": "10.0.0.6",
                            "ServicePort": 22,
                            "ServiceMeta": { "protocol": "ssh", "username": "ops" }
                        }),
                        "broken" => json!({
                            "ServiceName": "broken",
                            "ServiceAddress": "10.0.0.7",
                            "ServicePort": 99999,
                            "ServiceMeta": { "protocol": "vnc" }
                        }),
                        _ => return Json(json!([])),
                    };
                    Json(json!([record]))
                }),
            )
    }

    async fn spawn_api(registry_port: u16) -> String {
        let provider = ConsulAuthProvider::new(ConsulConfig {
            hostname: "127.0.0.1".to_string(),
            port: registry_port,
            token: None,
        });
        let port = serve(router(AppState { provider })).await;
        format!("http://127.0.0.1:{}", port)
    }

    #[tokio::test]
    async fn test_provider_identifier() {
        let base = spawn_api(1).await;
        let body: Value = reqwest::get(format!("{}/v1/provider", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["identifier"], "consulio");
    }

    #[tokio::test]
    async fn test_context_snapshot() {
        let registry = serve(registry_stub()).await;
        let base = spawn_api(registry).await;

        let snapshot: UserContextSnapshot = reqwest::get(format!("{}/v1/users/alice/context", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(snapshot.user, "alice");
        let ids: Vec<&str> = snapshot.connections.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["rdp1", "ssh1"]);
        assert_eq!(snapshot.permissions.connections, snapshot.root_group.connection_identifiers);
        assert!(snapshot.permissions.connection_groups.contains("ROOT"));
    }

    #[tokio::test]
    async fn test_single_connection_and_not_found() {
        let registry = serve(registry_stub()).await;
        let base = spawn_api(registry).await;

        let connection: Connection = reqwest::get(format!("{}/v1/users/alice/connections/ssh1", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(connection.configuration.protocol, "ssh");
        assert_eq!(connection.configuration.parameters.get("username").map(String::as_str), Some("ops"));

        let missing = reqwest::get(format!("{}/v1/users/alice/connections/broken", base))
            .await
            .unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_connections_by_ids() {
        let registry = serve(registry_stub()).await;
        let base = spawn_api(registry).await;

        let found: Vec<Connection> =
            reqwest::get(format!("{}/v1/users/alice/connections?ids=rdp1,missing,broken", base))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].identifier, "rdp1");
    }

    #[tokio::test]
    async fn test_registry_down_is_server_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed = listener.local_addr().unwrap().port();
        drop(listener);
        let base = spawn_api(closed).await;

        let response = reqwest::get(format!("{}/v1/users/alice/context", base))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
