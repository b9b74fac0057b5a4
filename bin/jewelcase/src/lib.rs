//! Jewelcase Server Library
//!
//! HTTP front end of the catalog: routes assemble CMS documents into a view
//! context, the renderer turns it into a page.
//!
//! # Modules
//!
//! - [`routes`] - Per-route document fetching
//! - [`server`] - Router, shared state and the listener
//! - [`error`] - Request errors and their HTTP responses
//!
//! # Example
//!
//! ```no_run
//! use jewelcase::{Config, server};
//!
//! # async fn start() -> color_eyre::Result<()> {
//! let config = Config::load(None)?;
//! server::run(config).await
//! # }
//! ```

pub mod error;
pub mod routes;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use error::SiteError;
pub use jewelcase_core::Config;
pub use routes::Route;

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE)
///
/// `RUST_LOG` directives are honored on top of the chosen level.
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
