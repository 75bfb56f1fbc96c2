use axum::{Router, extract::DefaultBodyLimit};
use tower_http::trace::TraceLayer;

use crate::DeploymentImpl;

pub mod tasks;

pub fn router(deployment: DeploymentImpl) -> Router {
    let body_limit = deployment.config().max_upload_bytes;

    let api = Router::new().merge(tasks::router(&deployment));

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}
