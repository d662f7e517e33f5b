pub mod app;
pub mod auth;
pub mod background;
pub mod bootstrap;
pub mod config;
pub mod events;
pub mod log_buffer;
pub mod player;
pub mod server;
pub mod shutdown;
pub mod store;
pub mod surfaces;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use bootstrap::{build_state, init_foundation, spawn_background_tasks};

/// Console output plus the in-memory buffer behind `/api/logs`.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(log_buffer::LogCaptureLayer)
        .init();
}
