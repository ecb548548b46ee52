//! Logging and tracing setup

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, prelude::*, util::SubscriberInitExt, EnvFilter};

/// Initialize logging; `FANTASY_LOG_FORMAT=json` switches to JSON lines
pub fn initialize_logging() -> Result<()> {
    let format = std::env::var("FANTASY_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    initialize_logging_with_format(&format)
}

pub fn initialize_logging_with_format(format: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match format {
        "json" => fmt::layer().json().with_target(true).with_file(true).with_line_number(true).boxed(),
        _ => fmt::layer().with_target(false).with_ansi(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}
