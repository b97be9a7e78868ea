//! Environment-driven configuration for a lobby host.

use std::sync::Arc;

use lobbyforge_host::LobbyRegistry;
use lobbyforge_launch::{HttpLauncher, LaunchConfig};
use lobbyforge_lobby::{IdentityDirectory, LobbyConfig};

use crate::LobbyforgeError;

const REQUIRED_PLAYERS_VAR: &str = "LOBBYFORGE_REQUIRED_PLAYERS";
const ALLOWED_OBSERVERS_VAR: &str = "LOBBYFORGE_ALLOWED_OBSERVERS";
const TICK_RATE_VAR: &str = "LOBBYFORGE_TICK_RATE";
const EMPTY_TIMEOUT_VAR: &str = "LOBBYFORGE_EMPTY_TIMEOUT_SECS";

/// Everything needed to stand up a [`LobbyRegistry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub lobby: LobbyConfig,
    pub launch: LaunchConfig,
}

impl Settings {
    /// Reads settings from the process environment. Unset variables keep
    /// their defaults; unparseable ones are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut lobby = LobbyConfig::default();
        read_into(&lookup, REQUIRED_PLAYERS_VAR, &mut lobby.required_player_count);
        read_into(&lookup, ALLOWED_OBSERVERS_VAR, &mut lobby.allowed_observers);
        read_into(&lookup, TICK_RATE_VAR, &mut lobby.tick_rate);
        read_into(&lookup, EMPTY_TIMEOUT_VAR, &mut lobby.empty_timeout_secs);

        Self {
            lobby: lobby.validated(),
            launch: LaunchConfig::from_lookup(&lookup),
        }
    }

    /// Builds a registry that provisions game servers over HTTP.
    pub fn registry<I: IdentityDirectory>(
        &self,
        directory: Arc<I>,
    ) -> Result<LobbyRegistry<I, HttpLauncher>, LobbyforgeError> {
        let launcher = HttpLauncher::new(self.launch.clone())?;
        tracing::info!(
            endpoint = %launcher.endpoint(),
            required = self.lobby.required_player_count,
            observers = self.lobby.allowed_observers,
            tick_rate = self.lobby.tick_rate,
            "lobby registry configured"
        );
        Ok(LobbyRegistry::new(
            self.lobby.clone(),
            directory,
            Arc::new(launcher),
        ))
    }
}

fn read_into<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(var = key, value = %raw, "ignoring unparseable setting"),
    }
}
