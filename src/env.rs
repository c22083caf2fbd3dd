//! Environment variable names used by this crate for convenient
//! configuration from services.
//!
//! These are purely helpers; loggers and sinks can always be configured
//! explicitly instead.

/// Filter directive for [`crate::init::init_tracing`], e.g. `info` or
/// `warn,my_service=debug`.
pub const FLUENT_LOG_LEVEL_ENV: &str = "FLUENT_LOG_LEVEL";

/// Set to `false` or `0` to disable console output.
pub const FLUENT_LOG_STDOUT_ENV: &str = "FLUENT_LOG_STDOUT";

/// Console format, `text` or `json`.
pub const FLUENT_LOG_FORMAT_ENV: &str = "FLUENT_LOG_FORMAT";

/// Overrides the process name recorded as the event domain.
pub const FLUENT_LOG_DOMAIN_ENV: &str = "FLUENT_LOG_DOMAIN";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a boolean flag; anything other than `0`, `false`, `no` or `off`
/// counts as set.
pub fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        Err(_) => default,
    }
}

/// Friendly name of the running process.
///
/// `FLUENT_LOG_DOMAIN` wins, then the executable's file stem, then
/// `"unknown"`.
pub fn process_name() -> String {
    if let Ok(domain) = std::env::var(FLUENT_LOG_DOMAIN_ENV) {
        if !domain.is_empty() {
            return domain;
        }
    }

    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back() {
        assert_eq!(env_or("FLUENT_LOG_TEST_SURELY_UNSET", "fallback"), "fallback");
    }

    #[test]
    fn env_flag_defaults_when_unset() {
        assert!(env_flag("FLUENT_LOG_TEST_FLAG_UNSET", true));
        assert!(!env_flag("FLUENT_LOG_TEST_FLAG_UNSET", false));
    }

    #[test]
    fn env_flag_reads_false_values() {
        std::env::set_var("FLUENT_LOG_TEST_FLAG_OFF", "Off");
        assert!(!env_flag("FLUENT_LOG_TEST_FLAG_OFF", true));
        std::env::set_var("FLUENT_LOG_TEST_FLAG_OFF", "yes");
        assert!(env_flag("FLUENT_LOG_TEST_FLAG_OFF", false));
        std::env::remove_var("FLUENT_LOG_TEST_FLAG_OFF");
    }

    #[test]
    fn process_name_is_never_empty() {
        assert!(!process_name().is_empty());
    }
}
