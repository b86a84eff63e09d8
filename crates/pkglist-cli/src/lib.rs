//! pip-package-list library - exposes the command implementations for the binary and tests

pub mod commands;
pub mod common;
pub mod output;

pub use common::GlobalOpts;

use pkglist_logger as logger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the `tracing` subscriber that prints library events on stderr.
///
/// `RUST_LOG` takes precedence over the level derived from `-v`.
pub fn init_tracing(verbosity: u8) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logger::filter_for_verbosity(verbosity).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}
