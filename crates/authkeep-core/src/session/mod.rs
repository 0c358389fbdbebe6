//! Session state and the controller that owns it.
//!
//! `SessionController` is the single owner of `SessionState`. It is built
//! once by the application's composition root and shared by reference;
//! observers subscribe through a `tokio::sync::watch` channel.

pub mod controller;
pub mod state;

pub use controller::SessionController;
pub use state::SessionState;
