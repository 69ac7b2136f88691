//! Safe SQL builder: identifiers from the field registry only, values as parameters.

mod builder;
mod filter;
mod order;
pub mod params;

pub use builder::*;
pub use filter::{parse_filters, Filter, FilterOp};
pub use order::{parse_order_by, OrderDirective};
pub use params::*;
