//! Route definitions for stateless scoring.
//!
//! Mounted at `/scoring` within the `/api/v1` tree.
//!
//! ```text
//! POST   /preview          -> preview
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::scoring;
use crate::state::AppState;

/// Build the `/scoring` router.
pub fn router() -> Router<AppState> {
    Router::new().route("/preview", post(scoring::preview))
}
