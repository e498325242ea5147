//! Core data models.

mod comparison;
mod ids;
mod tournament;

pub use comparison::*;
pub use ids::*;
pub use tournament::*;
