//! Bidirectional Drizzle schema source codec.

mod generate;
mod parse;
mod relations;
mod types;

pub use generate::generate;
pub use parse::{ParseError, parse};
pub use relations::{already_connected, infer_kind};
