pub mod analysis;
pub mod scoring;
