pub mod engine;
pub mod executor;
pub mod reporter;
pub mod types;

pub use engine::Engine;
pub use executor::{ExecutionContext, ScenarioRunner};
pub use reporter::Reporter;
pub use types::{Failure, RunReport, ScenarioOutcome, ScenarioState};
