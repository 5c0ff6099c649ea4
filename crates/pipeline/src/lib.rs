//! The scoring pass for one analysis.
//!
//! Three phases, kept apart:
//!
//! 1. **Collect**: check the detector, then send every staged image to it
//!    with bounded parallelism. A failed image is logged and skipped.
//! 2. **Score**: the pure scorer from `autocheck-core` over all collected
//!    observations.
//! 3. **Persist**: left to the caller, which writes the outcome atomically.

pub mod error;
pub mod pass;

pub use error::PipelineError;
pub use pass::{ScoringOutcome, ScoringPipeline, StagedImage};
