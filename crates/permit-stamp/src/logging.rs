//! Process-wide tracing setup. `log` records from this crate and its
//! dependencies are forwarded into the same subscriber.

use std::str::FromStr;
use std::sync::Once;

use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV_VAR: &str = "PERMIT_STAMP_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("Unknown log format '{}'", other)),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber. Only the first call has an effect, and
/// nothing is replaced if the host already installed a subscriber.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(env_filter());
        let installed = match format {
            LogFormat::Plain => tracing::subscriber::set_global_default(
                registry.with(tracing_subscriber::fmt::layer()),
            ),
            LogFormat::Json => tracing::subscriber::set_global_default(
                registry.with(tracing_subscriber::fmt::layer().json()),
            ),
        };
        if installed.is_err() {
            return;
        }
        // A `log` logger may already exist; records then stay with it.
        let _ = LogTracer::init();
    });
}
