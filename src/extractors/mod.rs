//! Request extractors: per-request database executor and the authenticated caller.

mod auth;
mod db;

pub use auth::{bearer_token, Caller, CurrentUser, SuperUser};
pub use db::Db;
