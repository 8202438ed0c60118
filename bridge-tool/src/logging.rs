//! Tracing setup
//!
//! The subscriber is installed before configuration is resolved, so config
//! loading can log. The configured level is applied afterwards unless
//! `RUST_LOG` already chose one.

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Level used until the configuration is loaded
pub const STARTUP_LOG_LEVEL: &str = "info";

/// Adjusts the filter of an installed logging subscriber
pub struct LogLevelControl {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogLevelControl {
    /// Switch to the configured `level`; a `RUST_LOG` filter is left alone
    pub fn apply_config_level(&self, level: &str) -> Result<()> {
        if self.from_env {
            return Ok(());
        }
        let filter = EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{}'", level))?;
        self.handle.reload(filter).context("Failed to apply log level")?;
        Ok(())
    }
}

/// Formatting subscriber writing to `make_writer`, plus its level control
pub fn logging_subscriber<W>(make_writer: W) -> (impl Subscriber + Send + Sync + 'static, LogLevelControl)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (initial, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(STARTUP_LOG_LEVEL), false),
    };
    let (filter, handle) = reload::Layer::new(initial);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(make_writer));
    (subscriber, LogLevelControl { handle, from_env })
}
