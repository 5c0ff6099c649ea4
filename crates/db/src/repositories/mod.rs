//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or an open transaction) as the first argument.

pub mod analysis_image_repo;
pub mod analysis_repo;
pub mod analysis_result_repo;

pub use analysis_image_repo::AnalysisImageRepo;
pub use analysis_repo::AnalysisRepo;
pub use analysis_result_repo::AnalysisResultRepo;

/// Shorthand for a Postgres transaction.
pub type PgTransaction<'a> = sqlx::Transaction<'a, sqlx::Postgres>;
