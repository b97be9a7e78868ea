//! Launch client configuration.

use std::time::Duration;

/// Environment variable holding the provisioning endpoint URL.
pub const ENDPOINT_VAR: &str = "LOBBYFORGE_LAUNCH_ENDPOINT";

/// Environment variable holding the request timeout in whole seconds.
pub const TIMEOUT_VAR: &str = "LOBBYFORGE_LAUNCH_TIMEOUT_SECS";

/// Where and how patiently to ask for a game server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Full URL of the provisioning endpoint.
    pub endpoint: String,
    /// Upper bound on the whole request, body included.
    pub timeout: Duration,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://servermanager:5000/GameServer".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl LaunchConfig {
    /// Reads [`ENDPOINT_VAR`] and [`TIMEOUT_VAR`], keeping defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENDPOINT_VAR).filter(|v| !v.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => tracing::warn!(
                    var = TIMEOUT_VAR,
                    value = %raw,
                    "ignoring invalid launch timeout"
                ),
            }
        }

        config
    }
}
