//! Configuration loader
//!
//! Loads configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment when one exists
//! 2. Attempts to build the configuration from environment variables
//! 3. Falls back to a config file only when neither the token nor the secret
//!    variable is set; any other environment error is returned unchanged
//! 4. Probes multiple paths for config files (JSON and TOML)
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `MIXPANEL_PROJECT_TOKEN` (required)
//! - `MIXPANEL_PROJECT_SECRET` (required)
//! - `MIXPANEL_PROJECT_ID`
//! - `MIXPANEL_SERVICE_ACCOUNT_USERNAME` / `MIXPANEL_SERVICE_ACCOUNT_SECRET`
//! - `MIXPANEL_REGION`: `us`, `eu` or `in`
//! - `MIXPANEL_REQUEST_TIMEOUT_SECS` / `MIXPANEL_EXPORT_TIMEOUT_SECS`
//! - `MIXPANEL_RETRY_MAX_ATTEMPTS` / `MIXPANEL_RETRY_BASE_DELAY_MS`
//! - `MIXPANEL_MAX_BATCH_SIZE`
//! - `MIXPANEL_LOG_LEVEL` / `MIXPANEL_LOG_JSON`
//!
//! ## File Locations
//! The loader probes `mixpanel.{toml,json}` then `config.{toml,json}` in the
//! working directory, its two parents, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use mixpanel_core::EndpointResolver;
use mixpanel_domain::{Config, Credentials, MixpanelError, Region, Result, ServiceAccount};

const FILE_NAMES: [&str; 4] = ["mixpanel.toml", "mixpanel.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `MixpanelError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value fails validation
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    if !env_configured(|key| std::env::var(key).ok()) {
        tracing::debug!("Project credentials not in environment, trying file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// True when either required credential variable is present. A present but
/// invalid environment is reported as-is instead of falling back to a file.
fn env_configured<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    ["MIXPANEL_PROJECT_TOKEN", "MIXPANEL_PROJECT_SECRET"].iter().any(|key| lookup(key).is_some())
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `MixpanelError::Config` if the token or secret is missing, or a
/// variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a configuration from any key lookup (environment, test maps).
fn from_lookup<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        lookup(key).filter(|value| !value.trim().is_empty()).ok_or_else(|| {
            MixpanelError::Config(format!("Missing required environment variable: {key}"))
        })
    };

    let mut credentials =
        Credentials::new(required("MIXPANEL_PROJECT_TOKEN")?, required("MIXPANEL_PROJECT_SECRET")?);

    if let Some(region) = lookup("MIXPANEL_REGION") {
        credentials.region = Region::from_str(&region).map_err(MixpanelError::Config)?;
    }
    credentials.project_id = lookup("MIXPANEL_PROJECT_ID");

    match (lookup("MIXPANEL_SERVICE_ACCOUNT_USERNAME"), lookup("MIXPANEL_SERVICE_ACCOUNT_SECRET")) {
        (Some(username), Some(secret)) => {
            credentials.service_account = Some(ServiceAccount { username, secret });
        }
        (None, None) => {}
        _ => {
            return Err(MixpanelError::Config(
                "MIXPANEL_SERVICE_ACCOUNT_USERNAME and MIXPANEL_SERVICE_ACCOUNT_SECRET must be set together"
                    .into(),
            ))
        }
    }

    let mut config = Config::new(credentials);

    if let Some(secs) = parse_var(&lookup, "MIXPANEL_REQUEST_TIMEOUT_SECS")? {
        config.transport.request_timeout_secs = secs;
    }
    if let Some(secs) = parse_var(&lookup, "MIXPANEL_EXPORT_TIMEOUT_SECS")? {
        config.transport.export_timeout_secs = secs;
    }
    if let Some(attempts) = parse_var(&lookup, "MIXPANEL_RETRY_MAX_ATTEMPTS")? {
        config.retry.max_attempts = attempts;
    }
    if let Some(delay) = parse_var(&lookup, "MIXPANEL_RETRY_BASE_DELAY_MS")? {
        config.retry.base_delay_ms = delay;
    }
    if let Some(size) = parse_var(&lookup, "MIXPANEL_MAX_BATCH_SIZE")? {
        config.batch.max_batch_size = size;
    }
    if let Some(level) = lookup("MIXPANEL_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("MIXPANEL_LOG_JSON") {
        config.logging.json = parse_bool(&json);
    }

    validate(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `MixpanelError::Config` if the file is missing, cannot be parsed,
/// or fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MixpanelError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MixpanelError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MixpanelError::Config(format!("Failed to read config file: {e}")))?;

    validate(parse_config(&contents, &config_path)?)
}

/// Parse configuration by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MixpanelError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MixpanelError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MixpanelError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// Returns the first existing candidate, or `None`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn validate(config: Config) -> Result<Config> {
    config.validate()?;
    EndpointResolver::new(config.endpoints.clone())?;
    Ok(config)
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| MixpanelError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Accepts `1`/`true`/`yes`/`on` (case-insensitive); anything else is false.
fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Mutex;

    use tempfile::Builder;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_vars_use_defaults() {
        let config = from_lookup(lookup(&[
            ("MIXPANEL_PROJECT_TOKEN", "tok"),
            ("MIXPANEL_PROJECT_SECRET", "sec"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.project_token, "tok");
        assert_eq!(config.credentials.region, Region::Us);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.batch.max_batch_size, 2000);
        assert!(config.credentials.service_account.is_none());
    }

    #[test]
    fn test_all_vars_set() {
        let config = from_lookup(lookup(&[
            ("MIXPANEL_PROJECT_TOKEN", "tok"),
            ("MIXPANEL_PROJECT_SECRET", "sec"),
            ("MIXPANEL_PROJECT_ID", "12345"),
            ("MIXPANEL_SERVICE_ACCOUNT_USERNAME", "svc.user"),
            ("MIXPANEL_SERVICE_ACCOUNT_SECRET", "svc-secret"),
            ("MIXPANEL_REGION", "EU"),
            ("MIXPANEL_REQUEST_TIMEOUT_SECS", "10"),
            ("MIXPANEL_EXPORT_TIMEOUT_SECS", "600"),
            ("MIXPANEL_RETRY_MAX_ATTEMPTS", "5"),
            ("MIXPANEL_RETRY_BASE_DELAY_MS", "250"),
            ("MIXPANEL_MAX_BATCH_SIZE", "500"),
            ("MIXPANEL_LOG_LEVEL", "debug"),
            ("MIXPANEL_LOG_JSON", "yes"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.region, Region::Eu);
        assert_eq!(config.credentials.project_id.as_deref(), Some("12345"));
        assert_eq!(config.credentials.require_service_account().unwrap().username, "svc.user");
        assert_eq!(config.transport.request_timeout_secs, 10);
        assert_eq!(config.transport.export_timeout_secs, 600);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.batch.max_batch_size, 500);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let err = from_lookup(lookup(&[("MIXPANEL_PROJECT_TOKEN", "tok")])).unwrap_err();
        assert!(matches!(err, MixpanelError::Config(msg) if msg.contains("MIXPANEL_PROJECT_SECRET")));
    }

    #[test]
    fn test_unknown_region_is_config_error() {
        let err = from_lookup(lookup(&[
            ("MIXPANEL_PROJECT_TOKEN", "tok"),
            ("MIXPANEL_PROJECT_SECRET", "sec"),
            ("MIXPANEL_REGION", "mars"),
        ]))
        .unwrap_err();
        assert_eq!(err, MixpanelError::Config("Invalid Region: mars".into()));
    }

    #[test]
    fn test_invalid_number_and_out_of_range_batch() {
        let base = [("MIXPANEL_PROJECT_TOKEN", "tok"), ("MIXPANEL_PROJECT_SECRET", "sec")];

        let mut vars = base.to_vec();
        vars.push(("MIXPANEL_RETRY_MAX_ATTEMPTS", "many"));
        assert!(matches!(from_lookup(lookup(&vars)), Err(MixpanelError::Config(_))));

        let mut vars = base.to_vec();
        vars.push(("MIXPANEL_MAX_BATCH_SIZE", "5000"));
        assert!(matches!(from_lookup(lookup(&vars)), Err(MixpanelError::Config(_))));
    }

    #[test]
    fn test_half_configured_service_account_is_rejected() {
        let err = from_lookup(lookup(&[
            ("MIXPANEL_PROJECT_TOKEN", "tok"),
            ("MIXPANEL_PROJECT_SECRET", "sec"),
            ("MIXPANEL_SERVICE_ACCOUNT_USERNAME", "svc.user"),
        ]))
        .unwrap_err();
        assert!(matches!(err, MixpanelError::Config(_)));
    }

    #[test]
    fn test_bool_parsing() {
        for raw in ["1", "true", "YES", " on "] {
            assert!(parse_bool(raw), "{raw} should be true");
        }
        for raw in ["0", "false", "no", "off", ""] {
            assert!(!parse_bool(raw), "{raw} should be false");
        }
    }

    #[test]
    fn test_load_from_process_env() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("MIXPANEL_PROJECT_TOKEN", "env-token");
        std::env::set_var("MIXPANEL_PROJECT_SECRET", "env-secret");

        let result = load_from_env();

        std::env::remove_var("MIXPANEL_PROJECT_TOKEN");
        std::env::remove_var("MIXPANEL_PROJECT_SECRET");

        let config = result.expect("config from env");
        assert_eq!(config.credentials.project_token, "env-token");
    }

    #[test]
    fn test_env_configured_needs_a_credential_variable() {
        assert!(!env_configured(lookup(&[("MIXPANEL_REGION", "eu")])));
        assert!(env_configured(lookup(&[("MIXPANEL_PROJECT_SECRET", "")])));
        assert!(env_configured(lookup(&[("MIXPANEL_PROJECT_TOKEN", "tok")])));
    }

    #[test]
    fn test_load_reports_bad_region_instead_of_file_fallback() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("MIXPANEL_PROJECT_TOKEN", "env-token");
        std::env::set_var("MIXPANEL_PROJECT_SECRET", "env-secret");
        std::env::set_var("MIXPANEL_REGION", "ap");

        let result = load();

        std::env::remove_var("MIXPANEL_PROJECT_TOKEN");
        std::env::remove_var("MIXPANEL_PROJECT_SECRET");
        std::env::remove_var("MIXPANEL_REGION");

        assert_eq!(result.unwrap_err(), MixpanelError::Config("Invalid Region: ap".into()));
    }

    #[test]
    fn test_load_from_file_toml() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[credentials]
project_token = "tok"
project_secret = "sec"
region = "in"

[retry]
max_attempts = 4
base_delay_ms = 100
"#
        )
        .unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.credentials.region, Region::In);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.batch.max_batch_size, 2000);
    }

    #[test]
    fn test_load_from_file_rejects_relative_override() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"credentials": {{"project_token": "tok", "project_secret": "sec"}},
                "endpoints": {{"query": "not a url"}}}}"#
        )
        .unwrap();

        let err = load_from_file(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, MixpanelError::Config(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = load_from_file(Some(file.path().to_path_buf())).unwrap_err();
        assert_eq!(err, MixpanelError::Config("Unsupported config format: yaml".into()));
    }

    #[test]
    fn test_missing_file() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/mixpanel.toml"))).unwrap_err();
        assert!(matches!(err, MixpanelError::Config(msg) if msg.contains("not found")));
    }
}
