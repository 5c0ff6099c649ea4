//! Row types and DTOs, one module per table group.

pub mod analysis;
pub mod analysis_image;
pub mod analysis_result;
