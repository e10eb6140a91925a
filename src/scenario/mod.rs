pub mod file_set;
pub mod loader;
pub mod types;

pub use file_set::FileSet;
pub use loader::{ScenarioLoader, flatten_steps};
pub use types::{
    ApiRequest, CustomOperation, Extractor, Filter, FlatStep, Guard, HandlerRef, LoadedScenario,
    Operation, Scalar, Scenario, Step, StepUnit, Validator,
};
