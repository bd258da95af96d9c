pub mod config;
pub mod errors;
pub mod types;
pub mod units;
pub mod utils;

pub use config::ServiceConfig;
pub use errors::{Error, Result};
pub use types::*;
