pub mod analysis;
pub mod health;
pub mod scoring;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /analyses                          create (POST)
/// /analyses/{id}                     get
/// /analyses/{id}/images              upload (POST, multipart), list
/// /analyses/{id}/score               run the scoring pass (POST)
/// /analyses/{id}/result              persisted result
///
/// /scoring/preview                   score observations without persisting (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/analyses", analysis::router())
        .nest("/scoring", scoring::router())
}
