use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use facility_siting::api::{self, AppState};
use facility_siting::config::AppConfig;

// ---------- Server bootstrap ----------
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();

    // Kept alive for the lifetime of the server so queued events are flushed on exit
    let _sentry_guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let port = config.port;
    let json_limit = config.json_payload_limit;
    log::info!(
        "Starting server on http://127.0.0.1:{} (default solver {:?})",
        port,
        config.default_solver
    );

    let state = web::Data::new(AppState::new(config));
    HttpServer::new(move || {
        App::new()
            .wrap(sentry_actix::Sentry::new())
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(api::json_config(json_limit))
            .configure(api::routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
