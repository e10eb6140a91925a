pub mod config;
pub mod error;
pub mod field;
pub mod http;
pub mod logger;
pub mod request;
pub mod runner;
pub mod scenario;
pub mod step;
pub mod utils;
pub mod variable;

// Re-export commonly used types
pub use error::{ParseError, ResatError, Result};
pub use runner::{Engine, Reporter, RunReport};
