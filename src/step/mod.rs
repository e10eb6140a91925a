//! request 之后的步骤：guard、filter、handler

pub mod filter;
pub mod guard;
pub mod handler;

pub use guard::{GuardOutcome, GuardState};
pub use handler::{Handler, HandlerRegistry};
