//! Standard computation library for nodeflow.
//!
//! This crate provides the built-in computations that node type tags
//! resolve to:
//!
//! ## Arithmetic (`math::*`)
//! - [`math::Constant`] - emits `config.value`
//! - [`math::Add`] / [`math::Multiply`] - fold every numeric input
//! - [`math::Subtract`] - `a` minus `b`
//! - [`math::Double`] - sole input times two
//!
//! ## Text (`text::*`)
//! - [`text::Concat`] - joins inputs with a separator
//! - [`text::Upper`] / [`text::Lower`] - case transforms
//!
//! ## Data (`std::*`)
//! - [`data::DataSource`] - emits `config.data`
//! - [`data::GenericProcess`] - passthrough
//! - [`data::Filter`] - field conditions over values and arrays
//! - [`data::DataSink`] - JSON or CSV rendering
//!
//! ## Flow control (`std::*`)
//! - [`flow::Delay`] - timed passthrough
//!
//! Use [`standard_registry`] to get a registry with all of them.

pub mod data;
pub mod flow;
pub mod math;
pub mod registry;
pub mod text;

pub use registry::{register_standard, standard_registry};

/// Prelude for commonly used types.
pub mod prelude {
    pub use crate::data::{DataSink, DataSource, Filter, FilterCondition, GenericProcess, SinkFormat};
    pub use crate::flow::Delay;
    pub use crate::math::{Add, Constant, Double, Multiply, Subtract};
    pub use crate::registry::{register_standard, standard_registry};
    pub use crate::text::{Concat, Lower, Upper};
}
