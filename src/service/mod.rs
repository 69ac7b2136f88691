//! Entity managers and the per-resource services built on them.

pub mod business;
mod education;
pub mod executor;
pub mod manager;
pub mod progress;
pub mod resource;
pub mod users;

pub use business::BusinessService;
pub use executor::{PgExecutor, QueryExecutor};
pub use manager::{EntityManager, WriteItem};
pub use progress::ProgressService;
pub use resource::{Listing, Resource, ResourceService};
pub use users::UserService;
