// Configuration loading for Courier
//
// Settings are read from prefixed environment variables, optionally seeded
// from a `.env` file.

pub mod env;
pub mod error;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use validation::{ConfigValidator, Validate};
