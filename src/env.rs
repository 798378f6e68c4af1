//! Environment variable names used by this crate for convenient
//! configuration of hooks from microservices.
//!
//! These are purely helpers; the hook itself never reads the environment.

/// Elasticsearch base URL, e.g. `http://127.0.0.1:9200`.
pub const ELASTIC_HOOK_URL_ENV: &str = "ELASTIC_HOOK_URL";

/// Target index name.
pub const ELASTIC_HOOK_INDEX_ENV: &str = "ELASTIC_HOOK_INDEX";

/// Optional basic-auth user name.
pub const ELASTIC_HOOK_USERNAME_ENV: &str = "ELASTIC_HOOK_USERNAME";

/// Optional basic-auth password.
pub const ELASTIC_HOOK_PASSWORD_ENV: &str = "ELASTIC_HOOK_PASSWORD";

/// Host label stored in every document.
pub const ELASTIC_HOOK_HOST_ENV: &str = "ELASTIC_HOOK_HOST";

/// Minimum severity, e.g. `warn`.
pub const ELASTIC_HOOK_LEVEL_ENV: &str = "ELASTIC_HOOK_LEVEL";

/// `true`/`1` selects async dispatch.
pub const ELASTIC_HOOK_ASYNC_ENV: &str = "ELASTIC_HOOK_ASYNC";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an optional environment variable, treating empty values as unset.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
