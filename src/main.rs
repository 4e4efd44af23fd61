use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, EnvFilter};
use wedding_backend::{
    errors::hide_error_details,
    graceful_shutdown::shutdown_signal,
    handlers::system::route_not_found,
    repositories::document_store::DocumentStore,
    routes::configure_routes,
    settings::AppConfig,
    storage::ObjectStore,
    AppState,
};

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter);

    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config);
    tracing::info!("Loaded configuration: {:?}", config);

    hide_error_details(config.is_production());

    let app_state = match AppState::connect(&config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Failed to initialise stores: {:#}", e);
            std::process::exit(1);
        }
    };

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {} (documents: {}, objects: {})",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        app_state.document_store.backend_name(),
        app_state.object_store.backend_name(),
    );

    let max_upload_bytes = config.max_upload_bytes;
    let server_config = config.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(wedding_backend::web::build_cors(&server_config))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(|cfg| configure_routes(cfg, max_upload_bytes))
            .default_service(web::to(route_not_found))
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
