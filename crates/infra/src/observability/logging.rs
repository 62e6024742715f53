//! Logging bootstrap powered by tracing-subscriber
//!
//! `RUST_LOG` wins over the configured level when it is set.

use mixpanel_domain::{LoggingConfig, MixpanelError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Noisy dependencies capped regardless of the base level.
const QUIET_TARGETS: &[(&str, &str)] =
    &[("hyper", "warn"), ("hyper_util", "warn"), ("reqwest", "warn"), ("h2", "warn"), ("rustls", "warn")];

/// Build the filter from `RUST_LOG` or the configured base level.
///
/// # Errors
/// Returns `MixpanelError::Config` for a level that is not a valid directive.
pub fn build_env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = vec![level.trim().to_string()];
    directives.extend(QUIET_TARGETS.iter().map(|(target, lvl)| format!("{target}={lvl}")));

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| MixpanelError::Config(format!("Invalid log filter '{filter_str}': {e}")))
}

/// Install the global subscriber: compact text, or JSON lines when
/// `config.json` is set.
///
/// # Errors
/// Returns `MixpanelError::Config` for an invalid level, or
/// `MixpanelError::Internal` when a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(&config.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry.with(tracing_subscriber::fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact().with_target(true)).try_init()
    };

    result.map_err(|e| MixpanelError::Internal(format!("tracing already initialized: {e}")))
}
