//! Workflow validation types.
//!
//! The checks themselves run while the engine builds a graph; this module
//! holds the error type they report and the size limits they enforce.

mod error;
mod limits;

pub use error::{ValidationError, ValidationErrorKind};
pub use limits::GraphLimits;
