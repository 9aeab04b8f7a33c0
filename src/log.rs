//! Initialisation of the program's `tracing` subscriber.
//!
//! Log events go to stderr so that reports printed on stdout stay clean. The
//! level comes from the `MICROGRID_LOG_LEVEL` environment variable, else from
//! the scenario's `[log]` section, else `info`.

use std::env;
use std::sync::OnceLock;

use tracing::level_filters::LevelFilter;

use crate::error::LogError;

/// Set once the global subscriber is installed
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Environment variable overriding the configured level.
pub const LOG_LEVEL_ENV: &str = "MICROGRID_LOG_LEVEL";

/// Level used when neither the environment nor the scenario names one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Parses a level name (case-insensitive).
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.to_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

/// Picks the effective level; the environment takes precedence over the
/// scenario.
///
/// # Errors
///
/// Returns [`LogError::UnknownLevel`] if the winning name is not a level.
pub fn resolve_level(
    from_env: Option<String>,
    from_config: Option<&str>,
) -> Result<LevelFilter, LogError> {
    let name = from_env.unwrap_or_else(|| from_config.unwrap_or(DEFAULT_LOG_LEVEL).to_string());
    parse_level(&name).ok_or(LogError::UnknownLevel(name))
}

/// Installs the global stderr subscriber.
///
/// Calling it again after a successful initialisation does nothing.
///
/// # Arguments
///
/// * `level_from_config` - The level named in the scenario's `[log]` section
///
/// # Errors
///
/// Returns a [`LogError`] for an unknown level name or if another global
/// subscriber is already installed.
pub fn init(level_from_config: Option<&str>) -> Result<(), LogError> {
    let level = resolve_level(env::var(LOG_LEVEL_ENV).ok(), level_from_config)?;
    if is_logger_initialised() {
        return Ok(());
    }

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = LOGGER_INIT.set(());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("off", LevelFilter::OFF)]
    #[case("error", LevelFilter::ERROR)]
    #[case("WARN", LevelFilter::WARN)]
    #[case("Info", LevelFilter::INFO)]
    #[case("debug", LevelFilter::DEBUG)]
    #[case("trace", LevelFilter::TRACE)]
    fn parses_known_levels(#[case] name: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_level(name), Some(expected));
    }

    #[test]
    fn rejects_unknown_level() {
        assert_eq!(parse_level("verbose"), None);
        assert!(matches!(
            resolve_level(None, Some("loud")),
            Err(LogError::UnknownLevel(name)) if name == "loud"
        ));
    }

    #[test]
    fn environment_overrides_config() {
        let level = resolve_level(Some("trace".into()), Some("warn")).ok();
        assert_eq!(level, Some(LevelFilter::TRACE));
    }

    #[test]
    fn defaults_to_info() {
        assert_eq!(resolve_level(None, None).ok(), Some(LevelFilter::INFO));
        assert_eq!(
            resolve_level(None, Some("debug")).ok(),
            Some(LevelFilter::DEBUG)
        );
    }
}
