//! Domain core for vehicle condition estimation.
//!
//! Everything in this crate is pure: part and defect vocabularies, the
//! weight tables, the observation normalizer, the part aggregator and
//! vehicle scorer, and the result assembler. I/O lives in the `db`,
//! `upstream`, `pipeline` and `api` crates.

pub mod analysis;
pub mod defects;
pub mod error;
pub mod matching;
pub mod observation;
pub mod parts;
pub mod registry;
pub mod result;
pub mod scoring;
pub mod types;
pub mod upload;
pub mod vin;
pub mod weights;
