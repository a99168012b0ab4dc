mod auth;
mod debug;
mod error;
mod logger;
mod routes;

use std::{any::Any, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_server::tls_rustls::RustlsConfig;
use clients::{Authenticator, ClientDefaults, ClientRegistry, Endpoint};
use config::Config;
use llm::{Dispatcher, LlmError};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};

use crate::{auth::ClientAuthLayer, debug::RequestDebugLayer};

pub use error::Error;
pub use logger::init as init_logger;

pub(crate) type Result<T> = std::result::Result<T, error::Error>;

/// Time given to in-flight requests once shutdown is signalled.
const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for serving the gateway.
pub struct ServeConfig {
    /// The socket address to bind to.
    pub listen_address: SocketAddr,
    /// The deserialized gateway TOML configuration.
    pub config: Config,
    /// Cancellation token for graceful shutdown.
    pub shutdown_signal: CancellationToken,
    /// Log filter string, e.g. "info" or "server=debug,llm=debug".
    pub log_filter: String,
}

/// Loads the client registry, builds the providers and serves the gateway until the shutdown
/// signal fires.
pub async fn serve(
    ServeConfig {
        listen_address,
        config,
        shutdown_signal,
        log_filter,
    }: ServeConfig,
) -> crate::Result<()> {
    logger::init(&log_filter);

    let registry = Arc::new(ClientRegistry::new(&config.clients, ClientDefaults::from(&config.llm)));
    let count = registry.load()?;

    log::info!(
        "Loaded {count} client configurations from {}",
        registry.config_dir().display()
    );

    let dispatcher = Arc::new(Dispatcher::from_config(&config.llm)?);

    let providers: Vec<_> = dispatcher.providers().ids().map(|id| id.to_string()).collect();
    log::info!("Enabled providers: {}", providers.join(", "));

    let app = router(&config, registry, dispatcher);

    let listener = TcpListener::bind(listen_address).await.map_err(Error::Bind)?;
    let prefix = &config.server.api_prefix;

    match &config.server.tls {
        Some(tls_config) => {
            // reqwest and axum-server pull in different rustls backends, so one has to be picked.
            let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

            let rustls_config = RustlsConfig::from_pem_file(&tls_config.certificate, &tls_config.key)
                .await
                .map_err(|e| Error::Tls(e.to_string()))?;

            log::info!("{} listening on https://{listen_address}{prefix}", config.server.project_name);

            let std_listener = listener.into_std().map_err(Error::Bind)?;

            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();

            tokio::spawn(async move {
                shutdown_signal.cancelled().await;
                shutdown_handle.graceful_shutdown(Some(GRACEFUL_SHUTDOWN_TIMEOUT));
            });

            axum_server::from_tcp_rustls(std_listener, rustls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(|e| Error::Server(std::io::Error::other(e)))?;
        }
        None => {
            log::info!("{} listening on http://{listen_address}{prefix}", config.server.project_name);

            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown_signal.cancelled().await })
                .await
                .map_err(Error::Server)?;
        }
    }

    log::info!("Server shut down");

    Ok(())
}

/// Assembles the gateway routes and middleware.
///
/// Authenticated routes live under the configured API prefix; `/` and `/health` are public.
pub fn router(config: &Config, registry: Arc<ClientRegistry>, dispatcher: Arc<Dispatcher>) -> Router {
    let authenticator = Authenticator::new(registry.clone());

    let generate = llm::router(dispatcher).route_layer(ClientAuthLayer::new(authenticator.clone(), Endpoint::Generate));

    let reload = Router::new()
        .route("/clients/reload", get(routes::reload_clients))
        .route_layer(ClientAuthLayer::new(authenticator, Endpoint::ClientsReload))
        .with_state(registry);

    let project_name: Arc<str> = Arc::from(config.server.project_name.as_str());

    let mut app = Router::new()
        .route("/", get(routes::root).with_state(project_name))
        .route("/health", get(routes::health))
        .nest(&config.server.api_prefix, generate.merge(reload));

    if config.server.debug_requests || log::log_enabled!(log::Level::Debug) {
        app = app.layer(RequestDebugLayer);
    }

    if config.server.cors.enabled {
        app = app.layer(CorsLayer::permissive());
    }

    app.layer(CatchPanicLayer::custom(handle_panic))
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let details = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    log::error!("Unhandled error while processing request: {details}");

    LlmError::Internal(None).into_response()
}
