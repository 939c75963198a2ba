//! Anonymous sign-in against the Identity Toolkit REST API.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use sn_core::ports::{AuthError, IdentityProviderPort};
use sn_core::Uid;

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";
pub const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com";

/// Refresh this long before the server-side expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    pub identity_toolkit: String,
    pub secure_token: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            identity_toolkit: IDENTITY_TOOLKIT_URL.to_string(),
            secure_token: SECURE_TOKEN_URL.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest {
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    id_token: String,
    refresh_token: String,
    local_id: String,
    expires_in: String,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

struct TokenState {
    id_token: String,
    refresh_token: String,
    expires_at: Instant,
}

fn expiry(expires_in: &str) -> Instant {
    let secs = expires_in.parse::<u64>().unwrap_or(0);
    Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN)
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.error.message,
        Err(_) => format!("HTTP {status}"),
    }
}

/// Anonymous identity backed by the hosted identity service.
///
/// The first successful sign-in is cached: later calls return the same UID
/// for the lifetime of this value, mirroring one browser session.
pub struct FirebaseAnonymousAuth {
    client: reqwest::Client,
    api_key: String,
    endpoints: AuthEndpoints,
    tokens: Mutex<Option<TokenState>>,
    uid: RwLock<Option<Uid>>,
}

impl FirebaseAnonymousAuth {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_endpoints(client, api_key, AuthEndpoints::default())
    }

    pub fn with_endpoints(
        client: reqwest::Client,
        api_key: impl Into<String>,
        endpoints: AuthEndpoints,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoints,
            tokens: Mutex::new(None),
            uid: RwLock::new(None),
        }
    }

    /// Current ID token for database requests, refreshed when close to
    /// expiry. `None` before sign-in.
    pub async fn id_token(&self) -> Result<Option<String>, AuthError> {
        let mut tokens = self.tokens.lock().await;
        let Some(state) = tokens.as_mut() else {
            return Ok(None);
        };
        if Instant::now() >= state.expires_at {
            debug!("refreshing anonymous id token");
            let refreshed = self.refresh(&state.refresh_token).await?;
            state.id_token = refreshed.id_token;
            state.refresh_token = refreshed.refresh_token;
            state.expires_at = expiry(&refreshed.expires_in);
        }
        Ok(Some(state.id_token.clone()))
    }

    /// Treat the cached token as expired so the next [`Self::id_token`]
    /// call refreshes it. Used when the server revokes a stream's credential.
    pub async fn expire_token(&self) {
        if let Some(state) = self.tokens.lock().await.as_mut() {
            state.expires_at = Instant::now();
        }
    }

    async fn sign_up(&self) -> Result<SignUpResponse, AuthError> {
        let url = format!(
            "{}/v1/accounts:signUp",
            self.endpoints.identity_toolkit.trim_end_matches('/')
        );
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&SignUpRequest {
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Denied(error_message(response).await));
        }
        response
            .json::<SignUpResponse>()
            .await
            .map_err(|e| AuthError::Unavailable(format!("malformed sign-up response: {e}")))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        let url = format!(
            "{}/v1/token",
            self.endpoints.secure_token.trim_end_matches('/')
        );
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&RefreshRequest {
                grant_type: "refresh_token",
                refresh_token,
            })
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Denied(error_message(response).await));
        }
        response
            .json::<RefreshResponse>()
            .await
            .map_err(|e| AuthError::Unavailable(format!("malformed token response: {e}")))
    }
}

#[async_trait]
impl IdentityProviderPort for FirebaseAnonymousAuth {
    async fn authenticate_anonymously(&self) -> Result<Uid, AuthError> {
        let mut tokens = self.tokens.lock().await;
        if tokens.is_some() {
            if let Some(uid) = self.current_uid() {
                return Ok(uid);
            }
        }

        let response = self.sign_up().await?;
        let uid = Uid::from(response.local_id);
        *tokens = Some(TokenState {
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: expiry(&response.expires_in),
        });
        if let Ok(mut current) = self.uid.write() {
            *current = Some(uid.clone());
        }
        info!(uid = %uid, "signed in anonymously");
        Ok(uid)
    }

    fn current_uid(&self) -> Option<Uid> {
        self.uid.read().ok().and_then(|uid| uid.clone())
    }
}
