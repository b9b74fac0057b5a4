//! HTTP server: router, shared state and the listener.

use std::{path::Path, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{Path as UrlPath, State},
    http::{HeaderMap, Uri, header::COOKIE},
    response::Html,
    routing::get,
};
use color_eyre::eyre::{Result, WrapErr};
use jewelcase_cms::{ApiFactory, CmsClient, RequestScope};
use jewelcase_core::Config;
use jewelcase_render::{Helpers, LinkResolver, SiteRenderer};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    error::SiteError,
    routes::{self, Route},
};

/// State shared by every request.
pub struct AppState<F> {
    /// Builds a content API handle per request.
    pub factory: F,
    /// Renders assembled contexts.
    pub renderer: SiteRenderer,
    /// Deadline for fetching a route's documents.
    pub route_timeout: Duration,
}

impl<F: ApiFactory> AppState<F> {
    pub fn new(factory: F, renderer: SiteRenderer, route_timeout: Duration) -> Self {
        Self {
            factory,
            renderer,
            route_timeout,
        }
    }

    /// Fetch, merge and render one route.
    pub async fn page(&self, route: Route, scope: RequestScope) -> Result<String, SiteError> {
        let fetch = async {
            let api = self.factory.connect(&scope).await?;
            Ok::<_, SiteError>(routes::assemble(&api, &route).await?)
        };

        let ctx = tokio::time::timeout(self.route_timeout, fetch)
            .await
            .map_err(|_| SiteError::Timeout(route.to_string()))??;

        Ok(self.renderer.render(route.view(), &ctx)?)
    }
}

/// Create the site router.
pub fn create_router<F: ApiFactory>(state: Arc<AppState<F>>, public_dir: &Path) -> Router {
    Router::new()
        .route("/", get(home::<F>))
        .route("/about", get(about::<F>))
        .route("/collections", get(collections::<F>))
        .route("/jewel/{uid}", get(product::<F>))
        .nest_service("/static", ServeDir::new(public_dir))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Cookies may arrive split across several `Cookie` headers (HTTP/2).
fn scope(headers: &HeaderMap) -> RequestScope {
    let cookies = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");
    RequestScope::from_cookie_header(Some(cookies.as_str()).filter(|c| !c.is_empty()))
}

async fn home<F: ApiFactory>(
    State(state): State<Arc<AppState<F>>>,
    headers: HeaderMap,
) -> Result<Html<String>, SiteError> {
    state.page(Route::Home, scope(&headers)).await.map(Html)
}

async fn about<F: ApiFactory>(
    State(state): State<Arc<AppState<F>>>,
    headers: HeaderMap,
) -> Result<Html<String>, SiteError> {
    state.page(Route::About, scope(&headers)).await.map(Html)
}

async fn collections<F: ApiFactory>(
    State(state): State<Arc<AppState<F>>>,
    headers: HeaderMap,
) -> Result<Html<String>, SiteError> {
    state
        .page(Route::Collections, scope(&headers))
        .await
        .map(Html)
}

async fn product<F: ApiFactory>(
    State(state): State<Arc<AppState<F>>>,
    UrlPath(uid): UrlPath<String>,
    headers: HeaderMap,
) -> Result<Html<String>, SiteError> {
    state
        .page(Route::Product { uid }, scope(&headers))
        .await
        .map(Html)
}

async fn not_found(uri: Uri) -> SiteError {
    SiteError::NotFound(uri.path().to_string())
}

/// Run the server until Ctrl-C.
pub async fn run(config: Config) -> Result<()> {
    let client = CmsClient::new(&config.cms).wrap_err("Failed to create CMS client")?;
    let renderer = SiteRenderer::new(config.site.clone(), Helpers::new(LinkResolver))
        .wrap_err("Failed to load templates")?;

    let state = Arc::new(AppState::new(client, renderer, config.route_timeout()));
    let app = create_router(state, Path::new(&config.server.public_dir));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    tracing::info!(
        %addr,
        endpoint = %config.cms.endpoint,
        public_dir = %config.server.public_dir,
        fetch_timeout = ?config.fetch_timeout(),
        route_timeout = ?config.route_timeout(),
        "Jewelcase listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
