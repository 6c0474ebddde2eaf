#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::MockServer;

use folio_remote::{BackendClient, RemoteConfig};

pub const ANON_KEY: &str = "anon-key";
pub const OWNER_ID: &str = "0b5b5c9e-2d0e-4b51-8a0a-8f9b3c6f7d11";

/// Start a mock backend and a client pointed at it.
pub async fn setup() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    let client = BackendClient::new(RemoteConfig::new(server.uri(), ANON_KEY));
    (server, client)
}

/// A `projects` row as the REST API returns it.
pub fn project_row(id: &str, title: &str, private: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "A project",
        "link": null,
        "github": null,
        "preview_image_url": null,
        "status": "Completed",
        "category": "Fun",
        "year": 2024,
        "featured": false,
        "private": private,
        "user_id": OWNER_ID,
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-02T12:00:00Z"
    })
}

/// A password-grant session response.
pub fn session_body(token: &str, email: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh",
        "user": {
            "id": OWNER_ID,
            "email": email,
            "user_metadata": { "display_name": "Owner" }
        }
    })
}
