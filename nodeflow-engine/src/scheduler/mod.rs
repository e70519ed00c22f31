//! Topological scheduler.
//!
//! - [`order`] - Kahn's algorithm with ascending-ID tie-breaking
//! - [`waves`] - the order grouped into sets of mutually independent nodes
//!
//! Both are pure functions of the graph: no I/O, no shared state.

mod topo;

pub use topo::{order, order_indices, wave_indices, waves};
