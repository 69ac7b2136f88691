//! Process settings, read once at startup from the environment.

mod settings;

pub use settings::{CorsOrigins, Settings};
