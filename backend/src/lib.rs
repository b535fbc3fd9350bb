pub mod catalog;
pub mod config;
pub mod error;
pub mod trails_handlers;

use std::{path::Path, sync::Arc};

use axum::{Router, routing::get};
use shared::ReferencePoint;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::catalog::TrailCatalog;
use crate::config::DEFAULT_NEARBY_LIMIT;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<TrailCatalog>,
    pub reference: Arc<ReferencePoint>,
    pub nearby_limit: usize,
}

impl AppState {
    pub fn new(catalog: TrailCatalog, reference: ReferencePoint) -> Self {
        Self {
            catalog: Arc::new(catalog),
            reference: Arc::new(reference),
            nearby_limit: DEFAULT_NEARBY_LIMIT,
        }
    }

    pub fn with_nearby_limit(mut self, nearby_limit: usize) -> Self {
        self.nearby_limit = nearby_limit;
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    build_router(state, None)
}

/// Router that also serves the built frontend from `static_dir`.
pub fn create_router_with_static(state: AppState, static_dir: &Path) -> Router {
    build_router(state, Some(static_dir))
}

// The fallback is registered before the layers so static files get CORS
// headers and request tracing too.
fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router: Router<AppState> = Router::new()
        .route("/api/trails", get(trails_handlers::list_trails))
        .route("/api/trails/:id", get(trails_handlers::get_trail))
        .route("/api/nearby-trails", get(trails_handlers::nearby_trails))
        .route(
            "/api/distance-sorted-trails",
            get(trails_handlers::distance_sorted_trails),
        );
    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
