//! String computations (`text::*`).

mod case;
mod concat;

pub use case::{Lower, Upper};
pub use concat::Concat;
