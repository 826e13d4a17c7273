use dotenvy::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use whowe::config::AppConfig;
use whowe::repositories::profile_repository::InMemoryProfileRepository;
use whowe::{router, AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,whowe=debug")
            .add_directive("hyper=warn".parse().expect("valid directive"))
            .add_directive("reqwest=warn".parse().expect("valid directive"))
    });
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let _sentry = config.sentry_dsn.clone().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    // Demo data until a real profile store is wired in.
    let repository = Arc::new(InMemoryProfileRepository::with_demo_profile());
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config, repository).expect("Failed to build geocoding client"));
    let app = router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
