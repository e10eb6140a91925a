pub mod persist;
pub mod resolver;
pub mod store;
pub mod types;

pub use persist::{read_variables, write_variables};
pub use resolver::{Substitute, substitute_str};
pub use store::{Carryover, VariableStore};
pub use types::{NameValue, Value};
