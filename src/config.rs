use crate::dispatch::{DispatchMode, OverflowPolicy};
use crate::env::{
    env_opt, env_or, ELASTIC_HOOK_ASYNC_ENV, ELASTIC_HOOK_HOST_ENV, ELASTIC_HOOK_LEVEL_ENV,
    ELASTIC_HOOK_PASSWORD_ENV, ELASTIC_HOOK_URL_ENV, ELASTIC_HOOK_USERNAME_ENV,
};
use crate::error::HookError;
use crate::level::Severity;
use std::time::Duration;

/// Hook configuration.
///
/// **Fields**
/// - `host`: label stored as `Host` in every document.
/// - `level`: minimum severity handled by the hook.
/// - `mode`: sync (caller waits) or async (worker pool).
/// - `queue_capacity`: records the async queue holds before `overflow`
///   applies.
/// - `workers`: tasks draining the async queue.
/// - `overflow`: what to discard when the queue is full.
/// - `write_timeout`: optional bound on a single document write.
#[derive(Clone, Debug)]
pub struct HookConfig {
    pub host: String,
    pub level: Severity,
    pub mode: DispatchMode,
    pub queue_capacity: usize,
    pub workers: usize,
    pub overflow: OverflowPolicy,
    pub write_timeout: Option<Duration>,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            level: Severity::Info,
            mode: DispatchMode::Sync,
            queue_capacity: 1024,
            workers: 4,
            overflow: OverflowPolicy::DropNewest,
            write_timeout: None,
        }
    }
}

impl HookConfig {
    pub fn new(host: impl Into<String>, level: Severity) -> Self {
        Self {
            host: host.into(),
            level,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build from `ELASTIC_HOOK_HOST`, `ELASTIC_HOOK_LEVEL` and
    /// `ELASTIC_HOOK_ASYNC`, keeping defaults for anything unset.
    pub fn from_env() -> Result<Self, HookError> {
        let mut config = Self::default();
        if let Some(host) = env_opt(ELASTIC_HOOK_HOST_ENV) {
            config.host = host;
        }
        if let Some(level) = env_opt(ELASTIC_HOOK_LEVEL_ENV) {
            config.level = level
                .parse()
                .map_err(|e| HookError::Config(format!("{ELASTIC_HOOK_LEVEL_ENV}: {e}")))?;
        }
        if let Some(flag) = env_opt(ELASTIC_HOOK_ASYNC_ENV) {
            config.mode = if parse_flag(&flag)? {
                DispatchMode::Async
            } else {
                DispatchMode::Sync
            };
        }
        Ok(config)
    }
}

fn parse_flag(value: &str) -> Result<bool, HookError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(HookError::Config(format!("{ELASTIC_HOOK_ASYNC_ENV}: not a boolean: {other}"))),
    }
}

/// Connection settings for the HTTP client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElasticConfig {
    /// Base URL without trailing path, e.g. "http://127.0.0.1:9200".
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            username: None,
            password: None,
        }
    }
}

impl ElasticConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_or(ELASTIC_HOOK_URL_ENV, "http://localhost:9200"),
            username: env_opt(ELASTIC_HOOK_USERNAME_ENV),
            password: env_opt(ELASTIC_HOOK_PASSWORD_ENV),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sync_info() {
        let config = HookConfig::default();
        assert_eq!(config.level, Severity::Info);
        assert_eq!(config.mode, DispatchMode::Sync);
        assert_eq!(config.queue_capacity, 1024);
        assert_eq!(config.workers, 4);
        assert_eq!(config.overflow, OverflowPolicy::DropNewest);
        assert!(config.write_timeout.is_none());
    }

    #[test]
    fn new_overrides_host_and_level() {
        let config = HookConfig::new("billing", Severity::Warn).with_mode(DispatchMode::Async);
        assert_eq!(config.host, "billing");
        assert_eq!(config.level, Severity::Warn);
        assert_eq!(config.mode, DispatchMode::Async);
    }

    #[test]
    fn flags_parse_common_spellings() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(parse_flag("1").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(matches!(parse_flag("maybe"), Err(HookError::Config(_))));
    }

    #[test]
    fn elastic_config_defaults_to_localhost() {
        let config = ElasticConfig::default();
        assert_eq!(config.url, "http://localhost:9200");
        assert!(config.username.is_none());
    }
}
