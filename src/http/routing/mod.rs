use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::routes::todos::BASE_PATH;

/// Mounts the todo routes under the API base path with tracing and open CORS.
pub fn app(todos: Router) -> Router {
    Router::new()
        .nest(BASE_PATH, todos)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
