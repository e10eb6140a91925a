pub mod builder;
pub mod delay;
pub mod dispatcher;

pub use builder::{DEFAULT_VALID_CODES, PreparedRequest, prepare, resolve_method};
pub use delay::Delay;
pub use dispatcher::ActiveRequest;
