//! Authentication adapter for the hosted auth API.
//!
//! Keeps the access token in the shared [`BackendClient`] so the project
//! store and uploader act as the signed-in user, and broadcasts
//! [`AuthEvent`]s to subscribers.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;

use folio_core::backend::{AuthEvent, Credentials, IdentityProvider};
use folio_core::error::CoreError;
use folio_core::roles::Identity;

use crate::client::BackendClient;
use crate::error::RemoteError;

/// Capacity of the auth event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// User object returned by the auth API.
#[derive(Debug, Deserialize)]
struct UserPayload {
    id: uuid::Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<serde_json::Value>,
}

impl From<UserPayload> for Identity {
    fn from(user: UserPayload) -> Self {
        let display_name = user
            .user_metadata
            .as_ref()
            .and_then(|m| m.get("display_name"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Identity {
            id: user.id,
            email: user.email,
            display_name,
        }
    }
}

/// Session returned by password sign-in (and confirmed sign-up).
#[derive(Debug, Deserialize)]
struct SessionPayload {
    access_token: String,
    user: UserPayload,
}

/// [`IdentityProvider`] backed by the hosted auth API.
pub struct HostedAuth {
    client: BackendClient,
    events: broadcast::Sender<AuthEvent>,
}

impl HostedAuth {
    pub fn new(client: BackendClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { client, events }
    }

    fn url(&self, path: &str) -> String {
        self.client.config().auth_url(path)
    }

    /// Store the session token and announce the new identity.
    async fn establish(&self, session: SessionPayload) -> Identity {
        self.client.set_access_token(Some(session.access_token)).await;
        let identity = Identity::from(session.user);
        tracing::info!(user_id = %identity.id, "Signed in");
        // No subscribers is fine.
        let _ = self.events.send(AuthEvent::SignedIn(identity.clone()));
        identity
    }
}

/// Bad credentials come back as 400; treat them as an auth rejection.
fn credential_error(err: RemoteError) -> CoreError {
    match err {
        RemoteError::Api {
            status: 400 | 401 | 403 | 422,
            message,
        } => CoreError::Unauthorized(message),
        other => other.into(),
    }
}

#[async_trait]
impl IdentityProvider for HostedAuth {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, CoreError> {
        let response = self
            .client
            .request(Method::POST, &self.url("token"))
            .await
            .query(&[("grant_type", "password")])
            .json(&json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await
            .map_err(RemoteError::from)?;

        let session: SessionPayload = BackendClient::parse_response(response)
            .await
            .map_err(credential_error)?;
        Ok(self.establish(session).await)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Identity>, CoreError> {
        let response = self
            .client
            .request(Method::POST, &self.url("signup"))
            .await
            .json(&json!({
                "email": credentials.email,
                "password": credentials.password,
                "data": {},
            }))
            .send()
            .await
            .map_err(RemoteError::from)?;

        let body: serde_json::Value = BackendClient::parse_response(response)
            .await
            .map_err(credential_error)?;

        // Without auto-confirm the API returns the bare user and no session.
        if body.get("access_token").is_some() {
            let session: SessionPayload = serde_json::from_value(body)
                .map_err(|e| RemoteError::Decode(e.to_string()))?;
            Ok(Some(self.establish(session).await))
        } else {
            tracing::info!(email = %credentials.email, "Sign-up pending confirmation");
            Ok(None)
        }
    }

    async fn send_magic_link(&self, email: &str) -> Result<(), CoreError> {
        let response = self
            .client
            .request(Method::POST, &self.url("otp"))
            .await
            .json(&json!({ "email": email, "create_user": true }))
            .send()
            .await
            .map_err(RemoteError::from)?;

        BackendClient::check_status(response).await?;
        tracing::info!(email = %email, "Magic link sent");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), CoreError> {
        if self.client.access_token().await.is_some() {
            let response = self
                .client
                .request(Method::POST, &self.url("logout"))
                .await
                .send()
                .await
                .map_err(RemoteError::from)?;
            // An already-expired token still counts as signed out.
            match BackendClient::check_status(response).await {
                Ok(()) | Err(RemoteError::Api { status: 401, .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.client.set_access_token(None).await;
        tracing::info!("Signed out");
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_identity(&self) -> Result<Option<Identity>, CoreError> {
        if self.client.access_token().await.is_none() {
            return Ok(None);
        }

        let response = self
            .client
            .request(Method::GET, &self.url("user"))
            .await
            .send()
            .await
            .map_err(RemoteError::from)?;

        match BackendClient::parse_response::<UserPayload>(response).await {
            Ok(user) => Ok(Some(user.into())),
            Err(RemoteError::Api { status: 401 | 403, .. }) => {
                tracing::warn!("Stored access token rejected, clearing session");
                self.client.set_access_token(None).await;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
