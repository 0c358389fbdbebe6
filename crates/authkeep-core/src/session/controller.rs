use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{watch, OnceCell};
use tracing::{debug, info, warn};

use crate::api::{AuthGateway, HttpTransport};
use crate::config::Config;
use crate::error::{AuthError, AuthResult};
use crate::models::{Credentials, Registration, TokenPair, User};

use super::SessionState;

/// Owner of the session state machine.
///
/// Operations apply their state transition in one step once they complete;
/// a failed operation leaves the state as it found it unless documented
/// otherwise.
pub struct SessionController {
    gateway: AuthGateway,
    state: watch::Sender<SessionState>,
    initialized: OnceCell<()>,
}

impl SessionController {
    pub fn new(gateway: AuthGateway) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            gateway,
            state,
            initialized: OnceCell::new(),
        }
    }

    /// Wire the production stack: HTTP transport, request authorizer,
    /// gateway and the configured token store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = config.open_token_store();
        let transport = HttpTransport::with_timeout(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let gateway = AuthGateway::authorized(
            Arc::new(transport),
            store,
            config.endpoints.clone(),
            config.messages(),
        );
        debug!(base_url = %config.api_base_url, backend = ?config.token_backend, "Session controller configured");
        Ok(Self::new(gateway))
    }

    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every applied transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// Authenticated in memory *and* a token is still stored.
    ///
    /// A token cleared underneath us (e.g. by a 401) downgrades this to false
    /// without any explicit transition.
    pub fn is_authenticated(&self) -> bool {
        let authenticated = matches!(*self.state.borrow(), SessionState::Authenticated(_));
        authenticated && self.gateway.has_session()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().is_settled()
    }

    pub fn access_token(&self) -> Option<String> {
        self.gateway.token()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Settle the session once per controller.
    ///
    /// The first caller runs the identity check; callers arriving while it is
    /// pending wait on the same check; later callers return at once.
    pub async fn initialize(&self) -> SessionState {
        self.initialized
            .get_or_init(|| self.check_session())
            .await;
        self.state()
    }

    async fn check_session(&self) {
        let started = self.state.send_if_modified(|current| {
            if *current == SessionState::Uninitialized {
                *current = SessionState::Initializing;
                true
            } else {
                false
            }
        });
        if !started {
            debug!(state = self.state.borrow().label(), "Session already settled, skipping check");
            return;
        }
        debug!(from = "uninitialized", to = "initializing", "Session state changed");

        if !self.gateway.has_session() {
            debug!("No stored access token");
            self.settle(SessionState::Unauthenticated);
            return;
        }

        match self.gateway.current_user().await {
            Ok(detail) => {
                info!(user_id = detail.user.id, "Stored session is valid");
                self.settle(SessionState::Authenticated(detail.summary()));
            }
            Err(e) => {
                warn!(error = %e, "Session check failed, discarding stored session");
                if *self.state.borrow() == SessionState::Initializing {
                    if let Err(logout_err) = self.gateway.logout().await {
                        warn!(error = %logout_err, "Failed to clear stale session");
                    }
                }
                self.settle(SessionState::Unauthenticated);
            }
        }
    }

    /// Log in with normalized credentials. On failure the state is untouched.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<User> {
        let credentials = Credentials::new(email, password).normalized();
        match self.gateway.login(&credentials).await {
            Ok(login) => {
                self.transition(SessionState::Authenticated(login.user.clone()));
                Ok(login.user)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                Err(e)
            }
        }
    }

    /// Create an account. Does not log in; the state is untouched either way.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> AuthResult<User> {
        let registration = Registration::new(email, password, password_confirm);
        if !registration.passwords_match() {
            return Err(AuthError::PasswordMismatch {
                message: self.gateway.messages().password_mismatch().to_string(),
            });
        }

        self.gateway.register(&registration.normalized()).await.map_err(|e| {
            warn!(error = %e, "Registration failed");
            e
        })
    }

    /// Clear the stored tokens, then become `Unauthenticated`.
    ///
    /// If clearing fails the state is left as-is and the error returned; the
    /// caller may still force a local reset with `reset`.
    pub async fn logout(&self) -> AuthResult<()> {
        self.gateway.logout().await?;
        self.transition(SessionState::Unauthenticated);
        Ok(())
    }

    /// Drop the in-memory session regardless of storage.
    pub fn reset(&self) {
        self.transition(SessionState::Unauthenticated);
    }

    /// Renew the token pair.
    ///
    /// Without a stored refresh token this is a forced logout. Other failures
    /// leave the state untouched.
    pub async fn refresh(&self) -> AuthResult<TokenPair> {
        match self.gateway.refresh_token().await {
            Ok(tokens) => Ok(tokens),
            Err(e @ AuthError::NoRefreshToken { .. }) => {
                info!("No refresh token, ending session");
                if let Err(logout_err) = self.gateway.logout().await {
                    warn!(error = %logout_err, "Failed to clear session after missing refresh token");
                }
                self.transition(SessionState::Unauthenticated);
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                Err(e)
            }
        }
    }

    fn transition(&self, next: SessionState) {
        let to = next.label();
        let previous = self.state.send_replace(next);
        debug!(from = previous.label(), to, "Session state changed");
    }

    /// Apply the outcome of the initial check, unless a login or logout
    /// already moved the state on while the check was pending.
    fn settle(&self, next: SessionState) {
        let to = next.label();
        let applied = self.state.send_if_modified(|current| {
            if *current == SessionState::Initializing {
                *current = next;
                true
            } else {
                false
            }
        });
        if applied {
            debug!(from = "initializing", to, "Session state changed");
        } else {
            debug!(to, "Session check outcome superseded");
        }
    }
}
