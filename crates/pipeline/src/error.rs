/// Errors that abort a scoring pass.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The detector failed its health check, or failed every image.
    #[error("Defect detector unavailable: {0}")]
    DetectorUnavailable(String),
}
