mod handlers;
mod state;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::config::EstimatorConfig;
use crate::store::MeasurementStore;

pub use state::AppState;

/// Register the API routes and the JSON body error handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(handlers::json_config())
        .route("/api/health", web::get().to(handlers::health))
        .route("/api/harvest-estimate", web::post().to(handlers::harvest_estimate))
        .route("/api/harvest-histogram", web::post().to(handlers::harvest_histogram));
}

pub async fn start_server(
    store: Box<dyn MeasurementStore>,
    config: EstimatorConfig,
) -> std::io::Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let data = web::Data::new(AppState::new(store, &config));

    tracing::info!(%host, port, "starting harvest estimator web server");
    println!("Starting Harvest Volume Estimator web server on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(data.clone())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
