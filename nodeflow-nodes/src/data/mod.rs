//! Data computations (`std::*`).
//!
//! - [`DataSource`] - emits configured data
//! - [`GenericProcess`] - passes its input through
//! - [`Filter`] - keeps values whose field satisfies a condition
//! - [`DataSink`] - renders its input as JSON or CSV

mod filter;
mod process;
mod sink;
mod source;

pub use filter::{Filter, FilterCondition};
pub use process::GenericProcess;
pub use sink::{DataSink, SinkFormat};
pub use source::DataSource;
