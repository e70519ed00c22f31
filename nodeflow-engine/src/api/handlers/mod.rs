//! API request handlers.

pub mod evaluations;
pub mod flows;
pub mod health;
pub mod nodes;
