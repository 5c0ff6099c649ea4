//! HTTP clients for the services the scorer depends on.
//!
//! - [`detector`]: the defect-detection model server (one image in,
//!   matched observations out) and its health check.
//! - [`registry`]: the government vehicle registry, queried by VIN.
//!
//! Both sit behind `async-trait` traits so the pipeline and the API can be
//! exercised with in-process fakes.

pub mod detector;
pub mod error;
mod http;
pub mod registry;

pub use detector::{DefectDetector, DetectorApi, ImagePayload};
pub use error::UpstreamError;
pub use registry::{RegistryApi, VehicleRegistry};
