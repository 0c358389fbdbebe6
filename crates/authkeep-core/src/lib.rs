//! authkeep core - session and token lifecycle for clients of a bearer-token API.
//!
//! The pieces, leaves first:
//!
//! - [`store`]: durable key/value persistence for the access, refresh and CSRF tokens
//! - [`api::AuthGateway`]: login, register, current user, refresh, logout
//! - [`api::RequestAuthorizer`]: attaches the bearer token to every request and
//!   clears stored tokens when the API answers 401
//! - [`session::SessionController`]: owns the session state machine
//!
//! Build one `SessionController` at startup (see
//! [`SessionController::from_config`]) and share it by reference.

pub mod api;
pub mod config;
pub mod error;
pub mod messages;
pub mod models;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{AuthGateway, Endpoints, RequestAuthorizer, Transport};
pub use config::Config;
pub use error::{AuthError, AuthResult};
pub use messages::{Locale, Messages};
pub use models::{Credentials, LoginResponse, Registration, TokenPair, User, UserDetail};
pub use session::{SessionController, SessionState};
pub use store::{StorageError, TokenBackend, TokenKey, TokenStore};
