use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware, routing::get, routing::post};
use rsvpd_core::{EventBroadcaster, PublicationClassifier};
use rsvpd_relay::SyncRelay;
use rsvpd_store::{
    DynSnapshotStore, FileSnapshotStore, NullSnapshotStore, RegistrationStore,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{admin, config::AppConfig, handlers, middleware as app_middleware};

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RegistrationStore>,
    pub classifier: Arc<PublicationClassifier>,
    pub admin_password: Arc<String>,
    /// Whether static relay endpoints exist (the runtime webhook URL may
    /// still be unset).
    pub has_static_endpoints: bool,
}

/// Build the full application router, wiring store, classifier and relay
/// from configuration. The relay task is detached; it lives as long as the
/// store's broadcaster.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let catalog = Arc::new(cfg.event_catalog()?);
    let classifier = Arc::new(PublicationClassifier::new(cfg.publication_roster()?)?);

    let snapshots: DynSnapshotStore = match &cfg.storage.snapshot_path {
        Some(path) => Arc::new(FileSnapshotStore::new(path)),
        None => Arc::new(NullSnapshotStore),
    };
    let broadcaster = EventBroadcaster::new_shared();
    let store = Arc::new(
        RegistrationStore::open(catalog, cfg.limits.into(), snapshots, broadcaster).await?,
    );

    let relay = SyncRelay::new(
        store.clone(),
        cfg.relay.endpoints.clone(),
        cfg.relay.image_host.clone(),
    );
    // Detached: the relay drains the broadcaster for as long as the store
    // lives; nothing awaits it.
    let _ = relay.spawn();

    let state = AppState {
        store,
        classifier,
        admin_password: Arc::new(cfg.admin.password.clone()),
        has_static_endpoints: !cfg.relay.endpoints.is_empty(),
    };

    let admin_routes = admin::admin_routes().layer(middleware::from_fn_with_state(
        state.clone(),
        app_middleware::admin_auth,
    ));

    let app = Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // Public RSVP flow
        .route("/api/occurrences", get(handlers::occurrences))
        .route("/api/classify", post(handlers::classify))
        .route("/api/registrations", post(handlers::register))
        .route("/api/waitlist", post(handlers::join_waitlist))
        .route("/api/invites", post(handlers::request_invite))
        // Admin surface behind the shared password
        .nest("/admin", admin_routes)
        // Middleware stack (order: request id -> cors -> compression -> trace -> body limit)
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(axum::extract::DefaultBodyLimit::max(cfg.server.body_limit_bytes))
        .with_state(state);

    Ok(app)
}

pub struct RsvpdServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<RsvpdServer> {
        let app = build_app(&self.config).await?;
        Ok(RsvpdServer {
            addr: self.addr,
            app,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RsvpdServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
