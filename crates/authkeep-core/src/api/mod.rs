//! REST API plumbing for the authentication service.
//!
//! This module provides:
//! - `Transport`: the seam every outgoing request passes through
//! - `HttpTransport`: reqwest-backed transport against the configured base URL
//! - `RequestAuthorizer`: transport decorator that attaches the bearer token
//!   and invalidates stored tokens on 401
//! - `AuthGateway`: login, register, current user, refresh and logout

pub mod authorizer;
pub mod error;
pub mod gateway;
pub mod transport;

pub use authorizer::RequestAuthorizer;
pub use error::TransportError;
pub use gateway::{AuthGateway, Endpoints};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
