use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use waste_classifier_service::artifacts::AppContext;
use waste_classifier_service::config::AppConfig;
use waste_classifier_service::handlers;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let cfg = AppConfig::from_env();
    let ctx = web::Data::new(AppContext::initialize(&cfg));
    tracing::info!("Server running at http://0.0.0.0:{}", cfg.port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(ctx.clone())
            .configure(handlers::configure)
    })
    .bind(("0.0.0.0", cfg.port))?
    .run()
    .await
}
