use service::domain::AppState;
use service::domain::authors::AuthorsGateway;
use service::infrastructure::AppStateImpl;
use service::infrastructure::http::{HttpServer, HttpServerConfig};
use service::infrastructure::settings::Settings;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppStateImpl::from_settings(&settings)?;

    // Advisory startup probe: the service still starts when the authors
    // service is down; author-dependent requests will fail until it is up.
    match state.publications().authors().health().await {
        Ok(()) => tracing::info!(url = %settings.authors.base_url, "authors service reachable"),
        Err(error) => {
            tracing::warn!(url = %settings.authors.base_url, %error, "authors service unreachable at startup")
        }
    }

    let server_config = HttpServerConfig {
        port: &settings.server_port,
    };
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
