//! Email/password accounts with database-backed bearer tokens.

pub mod password;
mod service;
pub mod token;

pub use service::{AuthService, LOGIN_BAD_CREDENTIALS, REGISTER_USER_ALREADY_EXISTS};
