//! Client for the authentication endpoints.
//!
//! Every method funnels failures through `normalize`, so callers only ever
//! see `AuthError` values with a message fit for display.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{AuthError, AuthResult};
use crate::messages::{Messages, Operation};
use crate::models::{Credentials, LoginResponse, Registration, TokenPair, User, UserDetail};
use crate::store::{TokenKey, TokenStore};

use super::error::{normalize, Failure};
use super::{ApiRequest, RequestAuthorizer, Transport};

/// Endpoint paths, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub login: String,
    pub register: String,
    pub current_user: String,
    pub refresh: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/api/v1/auth/login".to_string(),
            register: "/api/v1/auth/register".to_string(),
            current_user: "/api/v1/users/me".to_string(),
            refresh: "/api/v1/auth/refresh".to_string(),
        }
    }
}

/// Stateless façade over the authentication API.
/// Clone is cheap - transport and store are shared.
#[derive(Clone)]
pub struct AuthGateway {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    endpoints: Endpoints,
    messages: Messages,
}

impl AuthGateway {
    /// Use `transport` as given. It should already authorize requests.
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        endpoints: Endpoints,
        messages: Messages,
    ) -> Self {
        Self {
            transport,
            store,
            endpoints,
            messages,
        }
    }

    /// Route all calls through a `RequestAuthorizer` over `inner`.
    pub fn authorized(
        inner: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        endpoints: Endpoints,
        messages: Messages,
    ) -> Self {
        let transport = Arc::new(RequestAuthorizer::new(inner, store.clone()));
        Self::new(transport, store, endpoints, messages)
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Authenticate and persist the issued tokens.
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<LoginResponse> {
        let fallback = self.messages.fallback(Operation::Login);
        let body = to_body(credentials, fallback)?;

        let login: LoginResponse = self
            .call(ApiRequest::post(&self.endpoints.login, body), fallback)
            .await?;
        self.store_tokens(&login.tokens)?;

        info!(user_id = login.user.id, role = %login.user.role, "Login successful");
        Ok(login)
    }

    /// Create an account. No tokens are issued or stored.
    pub async fn register(&self, registration: &Registration) -> AuthResult<User> {
        let fallback = self.messages.fallback(Operation::Register);
        let body = to_body(registration, fallback)?;

        let user: User = self
            .call(ApiRequest::post(&self.endpoints.register, body), fallback)
            .await?;

        info!(user_id = user.id, "Registration successful");
        Ok(user)
    }

    pub async fn current_user(&self) -> AuthResult<UserDetail> {
        let fallback = self.messages.fallback(Operation::CurrentUser);
        self.call(ApiRequest::get(&self.endpoints.current_user), fallback)
            .await
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Fails with `NoRefreshToken` before any network call if none is stored.
    pub async fn refresh_token(&self) -> AuthResult<TokenPair> {
        let fallback = self.messages.fallback(Operation::Refresh);
        let refresh_token = match self.store.get(TokenKey::Refresh)? {
            Some(token) if !token.is_empty() => token,
            _ => {
                debug!("Refresh requested without a stored refresh token");
                return Err(AuthError::NoRefreshToken {
                    message: self.messages.no_refresh_token().to_string(),
                });
            }
        };

        let body = serde_json::json!({ "refresh_token": refresh_token });
        let tokens: TokenPair = self
            .call(ApiRequest::post(&self.endpoints.refresh, body), fallback)
            .await?;
        self.store_tokens(&tokens)?;

        debug!(token_id = %tokens.token_id, "Tokens refreshed");
        Ok(tokens)
    }

    /// Clear every stored token. Local only.
    pub async fn logout(&self) -> AuthResult<()> {
        match self.store.clear(&TokenKey::ALL) {
            Ok(()) => {
                info!("Stored tokens cleared");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to clear stored tokens");
                Err(AuthError::LogoutFailure {
                    message: self.messages.fallback(Operation::Logout).to_string(),
                    source: e,
                })
            }
        }
    }

    /// The stored access token, if readable
    pub fn token(&self) -> Option<String> {
        self.store.get(TokenKey::Access).ok().flatten()
    }

    /// Token presence only; says nothing about validity.
    pub fn has_session(&self) -> bool {
        self.store.has_access_token()
    }

    fn store_tokens(&self, tokens: &TokenPair) -> AuthResult<()> {
        self.store.set(TokenKey::Access, &tokens.access_token)?;
        if !tokens.refresh_token.is_empty() {
            if let Err(e) = self.store.set(TokenKey::Refresh, &tokens.refresh_token) {
                // A half-stored pair must not read as a session
                if let Err(cleanup) = self.store.remove(TokenKey::Access) {
                    warn!(error = %cleanup, "Failed to drop access token after partial store");
                }
                return Err(e.into());
            }
        }
        Ok(())
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest, fallback: &str) -> AuthResult<T> {
        let method = request.method;
        let path = request.path.clone();

        let result = match self.transport.send(request).await {
            Ok(response) if response.is_success() => {
                response.json::<T>().map_err(|e| Failure::Other(e.to_string()))
            }
            Ok(response) => Err(Failure::Response(response)),
            Err(e) => Err(Failure::from(e)),
        };

        result.map_err(|failure| {
            let err = normalize(failure, fallback);
            if let AuthError::AuthFailure { ref cause, status, .. } = err {
                warn!(%method, path = %path, ?status, cause = %cause, "API call failed");
            }
            err
        })
    }
}

fn to_body<B: Serialize>(body: &B, fallback: &str) -> AuthResult<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| normalize(Failure::Other(e.to_string()), fallback))
}
