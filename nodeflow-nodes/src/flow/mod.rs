//! Flow control computations.
//!
//! - [`Delay`] - waits a fixed time, then passes its input through

mod delay;

pub use delay::Delay;
