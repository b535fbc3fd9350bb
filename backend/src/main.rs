use backend::{
    AppState, catalog::TrailCatalog, config::ServerConfig, create_router,
    create_router_with_static,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "backend=debug,shared=debug,tower_http=info,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    let reference = config.reference()?;

    let catalog = TrailCatalog::load(config.trails_json.as_deref())?;
    match &config.trails_json {
        Some(path) => tracing::info!("loaded {} trails from {}", catalog.len(), path.display()),
        None => tracing::info!("loaded {} bundled trails", catalog.len()),
    }
    tracing::info!(
        "reference location {:?} at ({:.4}, {:.4})",
        reference.name,
        reference.lat,
        reference.lng
    );

    let state = AppState::new(catalog, reference).with_nearby_limit(config.nearby_limit);
    let app = match &config.static_dir {
        Some(dir) => {
            tracing::info!("serving frontend from {}", dir.display());
            create_router_with_static(state, dir)
        }
        None => create_router(state),
    };

    tracing::info!("starting backend on http://{}", config.bind);
    tracing::info!("API endpoints:");
    tracing::info!("  GET /api/trails - All trails in catalog order");
    tracing::info!("  GET /api/trails/:id - Single trail");
    tracing::info!(
        "  GET /api/nearby-trails - Nearest {} trails (lat, lng, name, limit optional)",
        config.nearby_limit
    );
    tracing::info!("  GET /api/distance-sorted-trails - All trails, nearest first");

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
