use std::net::SocketAddr;
use std::sync::OnceLock;

use anyhow::Context;
use axum::Router;
use axum::routing::{get, patch, post};
use axum_prometheus::PrometheusMetricLayer;
use axum_prometheus::metrics_exporter_prometheus::PrometheusHandle;
use tokio::net;

use crate::domain::AppState;
use crate::infrastructure::http::handlers::health_check;
use crate::infrastructure::http::handlers::publications::{
    approve_publication, create_publication, delete_publication, get_publication,
    list_publications, publication_statistics, publish_publication, reject_publication,
    submit_for_review, update_publication, update_publication_status,
};

mod api;
mod handlers;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: axum::Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(state: impl AppState, config: HttpServerConfig<'_>) -> anyhow::Result<Self> {
        let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("http_request", method = ?request.method(), uri)
            },
        );
        let (prometheus_layer, metric_handle) = metrics_pair().clone();

        let router = Router::new()
            .route("/health", get(health_check))
            .merge(publication_routes())
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(trace_layer)
            .layer(prometheus_layer)
            .with_state(state);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener.local_addr().context("no local address for listener")
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!("listening on {:?}", self.listener.local_addr());
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

// The Prometheus recorder is global to the process; pairing once and
// cloning lets several servers (tests) share it instead of panicking on a
// second registration.
fn metrics_pair() -> &'static (PrometheusMetricLayer<'static>, PrometheusHandle) {
    static PAIR: OnceLock<(PrometheusMetricLayer<'static>, PrometheusHandle)> = OnceLock::new();
    PAIR.get_or_init(PrometheusMetricLayer::pair)
}

fn publication_routes<S: AppState>() -> Router<S> {
    Router::new()
        .route(
            "/publications",
            post(create_publication::<S>).get(list_publications::<S>),
        )
        .route(
            "/publications/{id}",
            get(get_publication::<S>)
                .put(update_publication::<S>)
                .delete(delete_publication::<S>),
        )
        .route("/publications/{id}/status", patch(update_publication_status::<S>))
        .route("/publications/{id}/submit-review", post(submit_for_review::<S>))
        .route("/publications/{id}/approve", post(approve_publication::<S>))
        .route("/publications/{id}/reject", post(reject_publication::<S>))
        .route("/publications/{id}/publish", post(publish_publication::<S>))
        .route("/publications/stats/summary", get(publication_statistics::<S>))
}
