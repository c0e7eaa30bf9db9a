use actix_web::{middleware, web, App, HttpServer};
use imgrelay::defaults::RUST_LOG;
use imgrelay::gateway::InferenceGateway;
use imgrelay::server::{self, AppState};
use imgrelay::settings::Settings;

use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(RUST_LOG)),
        )
        .init();

    let settings = Settings::load()?;
    info!("loaded {settings:?}");

    let state = web::Data::new(AppState {
        gateway: InferenceGateway::from_settings(&settings)?,
        max_upload_bytes: settings.max_upload_bytes,
    });

    let mut http = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(server::cors())
            .wrap(middleware::Logger::default())
            .configure(server::configure)
    });
    if let Some(workers) = settings.workers {
        http = http.workers(workers);
    }

    info!("relaying to {} on {}:{}", settings.endpoint_url, settings.host, settings.port);
    http.bind(settings.bind_addr())?.run().await?;
    Ok(())
}
