//! Data models for the authentication API.
//!
//! This module contains the wire and domain types exchanged with the
//! remote API:
//!
//! - `Credentials`: transient login input, normalized before transmission
//! - `TokenPair`, `LoginResponse`: issued access/refresh credentials
//! - `User`, `UserDetail`: read-through projections of the server's account

pub mod credentials;
pub mod timestamp;
pub mod token;
pub mod user;

pub use credentials::{Credentials, Registration};
pub use token::{LoginResponse, TokenPair};
pub use user::{User, UserDetail};
