use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::store::{TokenKey, TokenStore};

use super::{ApiRequest, ApiResponse, Transport, TransportError};

/// Transport decorator that keeps every request authorized.
///
/// Outgoing: attaches `Authorization: Bearer <access token>` when one is
/// stored. Incoming: a 401 clears the access and refresh tokens before the
/// response reaches the caller, so any later check sees the session as gone.
/// Nothing is retried here.
pub struct RequestAuthorizer {
    inner: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
}

impl RequestAuthorizer {
    pub fn new(inner: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        Self { inner, store }
    }

    /// Request hook. Never fails: unreadable storage means an unauthenticated request.
    pub fn authorize(&self, request: &mut ApiRequest) {
        match self.store.get(TokenKey::Access) {
            Ok(Some(token)) if !token.is_empty() => {
                request.set_header("Authorization", format!("Bearer {}", token));
            }
            Ok(_) => {
                debug!(path = %request.path, "No access token, sending unauthenticated");
            }
            Err(e) => {
                warn!(error = %e, path = %request.path, "Token storage unreadable, sending unauthenticated");
            }
        }
    }

    /// Response hook. Success and non-401 failures pass through untouched.
    pub fn inspect(&self, response: &ApiResponse) {
        if !response.is_unauthorized() {
            return;
        }
        warn!("Authorization failure, clearing stored tokens");
        if let Err(e) = self.store.clear(&[TokenKey::Access, TokenKey::Refresh]) {
            warn!(error = %e, "Failed to clear tokens after authorization failure");
        }
    }
}

#[async_trait]
impl Transport for RequestAuthorizer {
    async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.authorize(&mut request);
        let response = self.inner.send(request).await?;
        self.inspect(&response);
        Ok(response)
    }
}
