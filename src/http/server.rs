//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the locale handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to a plain or TLS listener
//! - Route every request through the `LocaleRouter`
//! - Forward rewritten and passed-through requests upstream
//! - Swap the compiled router when a new configuration arrives

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{
        request::Parts,
        uri::{Authority, Scheme},
        HeaderValue, Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Semaphore};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigError, ServiceConfig, ValidationError};
use crate::http::request::{request_id, request_view, RequestIdGenerator, X_LOCALE, X_REQUEST_ID};
use crate::http::response::{apply_locale_headers, redirect_response};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::routing::{Action, LocaleRouter};

/// Grace period for in-flight requests once shutdown is requested.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ArcSwap<LocaleRouter>>,
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
    /// Bounds concurrently handled requests.
    pub permits: Arc<Semaphore>,
}

/// HTTP server for the locale gateway.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    locale_router: Arc<ArcSwap<LocaleRouter>>,
}

impl HttpServer {
    /// Compile the routing configuration and build the server.
    pub fn new(config: ServiceConfig) -> Result<Self, ConfigError> {
        let locale_router = Arc::new(ArcSwap::from_pointee(LocaleRouter::new(&config.routing)?));
        let upstream = Authority::from_str(&config.upstream.address).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidUpstream(
                config.upstream.address.clone(),
            )])
        })?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            router: locale_router.clone(),
            client,
            upstream,
            permits: Arc::new(Semaphore::new(config.listener.max_connections)),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            locale_router,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new().fallback(locale_handler).with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestIdGenerator))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        spawn_reloader(self.locale_router.clone(), config_updates);

        let app = self.router.into_make_service();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        spawn_reloader(self.locale_router.clone(), config_updates);

        let handle = Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            shutdown.wait().await;
            tracing::info!("Shutdown signal received");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        let app = self.router.into_make_service();
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The currently active compiled router.
    pub fn locale_router(&self) -> Arc<LocaleRouter> {
        self.locale_router.load_full()
    }
}

/// Apply routing updates until the sender goes away.
///
/// A configuration that fails to compile leaves the active router in place.
fn spawn_reloader(
    router: Arc<ArcSwap<LocaleRouter>>,
    mut updates: mpsc::UnboundedReceiver<ServiceConfig>,
) {
    tokio::spawn(async move {
        while let Some(config) = updates.recv().await {
            match LocaleRouter::new(&config.routing) {
                Ok(next) => {
                    router.store(Arc::new(next));
                    metrics::record_reload(true);
                    tracing::info!(
                        locales = config.routing.locales.len(),
                        domains = config.routing.domains.len(),
                        "Routing configuration reloaded"
                    );
                }
                Err(e) => {
                    metrics::record_reload(false);
                    tracing::error!(error = %e, "Rejected routing configuration, keeping current");
                }
            }
        }
    });
}

/// Resolves the locale, then redirects or forwards upstream.
async fn locale_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();

    let Ok(_permit) = state.permits.clone().acquire_owned().await else {
        metrics::record_request(503, start_time);
        return (StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down").into_response();
    };

    let router = state.router.load_full();
    let (parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers);
    let view = request_view(&parts, router.cookie_name());
    let outcome = router.route(&view);

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %view.path,
        locale = %outcome.locale,
        source = %outcome.source,
        action = outcome.action.kind(),
        "Locale resolved"
    );
    metrics::record_decision(&outcome);

    let mut response = match &outcome.action {
        Action::Redirect { location } => redirect_response(location),
        Action::Rewrite { path } => forward(&state, parts, body, &outcome.locale, Some(path), &request_id).await,
        Action::PassThrough => forward(&state, parts, body, &outcome.locale, None, &request_id).await,
    };

    apply_locale_headers(response.headers_mut(), &outcome);
    metrics::record_request(response.status().as_u16(), start_time);
    response
}

/// Send the request upstream, optionally under a rewritten path.
async fn forward(
    state: &AppState,
    mut parts: Parts,
    body: Body,
    locale: &str,
    rewrite: Option<&str>,
    request_id: &str,
) -> Response {
    let target = match rewrite {
        Some(path) => path,
        None => parts.uri.path_and_query().map_or("/", |pq| pq.as_str()),
    };

    let uri = match Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(state.upstream.clone())
        .path_and_query(target)
        .build()
    {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, target = %target, error = %e, "Invalid upstream URI");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid upstream URI").into_response();
        }
    };
    parts.uri = uri;

    if let Ok(value) = HeaderValue::from_str(locale) {
        parts.headers.insert(X_LOCALE, value);
    }

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
