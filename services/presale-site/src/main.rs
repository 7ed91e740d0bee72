mod config;
mod presale;

use axum::{Json, Router, http::StatusCode, routing::get};
use config::SiteConfig;
use dwat_presale::presale_terms;
use dwat_types::PresaleTerms;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    error: String,
}

pub(crate) type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) terms: Arc<PresaleTerms>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = SiteConfig::from_env()?;
    let app = app(&config);

    info!(
        "presale-site listening on {} (bundle: {}, sale ends {})",
        config.addr,
        config.static_dir.display(),
        config.end_date
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// JSON endpoints first; every other path is a file from the bundle, and
/// unknown paths get `index.html` so client-side routes like `/presale`
/// load the app.
fn app(config: &SiteConfig) -> Router {
    let state = AppState {
        terms: Arc::new(presale_terms(&config.end_date)),
    };

    let index = config.static_dir.join("index.html");
    let bundle = ServeDir::new(&config.static_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/presale/terms", get(presale::terms))
        .route("/presale/quote", get(presale::quote))
        .fallback_service(bundle)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "presale-site",
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "presale-site",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub(crate) fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use std::path::Path;
    use tower::ServiceExt;

    fn test_app(static_dir: &Path) -> Router {
        app(&SiteConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            static_dir: static_dir.to_path_buf(),
            end_date: "2024-12-31T23:59:59Z".to_owned(),
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = get(app, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn bundle() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>presale</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log('dwat')").unwrap();
        dir
    }

    #[tokio::test]
    async fn health_and_version() {
        let dir = bundle();
        let (status, body) = get_json(test_app(dir.path()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "presale-site");

        let (status, body) = get_json(test_app(dir.path()), "/version").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn serves_bundle_files() {
        let dir = bundle();
        let (status, body) = get(test_app(dir.path()), "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"console.log('dwat')");
    }

    #[tokio::test]
    async fn client_routes_fall_back_to_index() {
        let dir = bundle();
        for route in ["/", "/about", "/careers", "/wallet-connect", "/presale"] {
            let (status, body) = get(test_app(dir.path()), route).await;
            assert_eq!(status, StatusCode::OK, "{route}");
            assert_eq!(body, b"<html>presale</html>", "{route}");
        }
    }
}
