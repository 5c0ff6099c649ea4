//! Route definitions for analyses.
//!
//! Mounted at `/analyses` within the `/api/v1` tree.
//!
//! ```text
//! POST   /                 -> create
//! GET    /{id}             -> get_by_id
//! POST   /{id}/images      -> upload_images (?position=front|rear|left|right|other)
//! GET    /{id}/images      -> list_images
//! POST   /{id}/score       -> score
//! GET    /{id}/result      -> get_result
//! ```

use autocheck_core::upload::MAX_IMAGE_BYTES;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::analysis;
use crate::state::AppState;

/// Upper bound for one multipart upload request.
const MAX_UPLOAD_REQUEST_BYTES: usize = 8 * MAX_IMAGE_BYTES;

/// Build the `/analyses` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(analysis::create))
        .route("/{id}", get(analysis::get_by_id))
        .route(
            "/{id}/images",
            post(analysis::upload_images)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_REQUEST_BYTES))
                .get(analysis::list_images),
        )
        .route("/{id}/score", post(analysis::score))
        .route("/{id}/result", get(analysis::get_result))
}
