//! Row structs and DTOs, one module per table.

pub mod audit;
pub mod pingback;
pub mod post;
