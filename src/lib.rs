pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod ocr;
pub mod parser;
pub mod pdf_extractor;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Console logging for both binaries; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "well_report_ingest=info,well_report_server=info,well_ingest=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
