//! The [`Launcher`] seam and its HTTP implementation.

use std::future::Future;

use lobbyforge_protocol::{LaunchRequest, LobbyId};

use crate::{LaunchConfig, LaunchError};

/// Provisions a game server for a lobby.
///
/// Returns the service's response body, which the lobby broadcasts to its
/// participants as the `GAME_START` payload without inspecting it.
///
/// Implementations must bound the call in time; the lobby stops ticking
/// while it waits.
pub trait Launcher: Send + Sync + 'static {
    fn launch(
        &self,
        lobby_id: &LobbyId,
    ) -> impl Future<Output = Result<Vec<u8>, LaunchError>> + Send;
}

/// [`Launcher`] that POSTs `{"matchId": "<lobby id>"}` as JSON to
/// [`LaunchConfig::endpoint`].
#[derive(Debug, Clone)]
pub struct HttpLauncher {
    client: reqwest::Client,
    config: LaunchConfig,
}

impl HttpLauncher {
    /// Builds a launcher whose requests time out after `config.timeout`.
    pub fn new(config: LaunchConfig) -> Result<Self, LaunchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(LaunchError::Client)?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn classify(&self, err: reqwest::Error) -> LaunchError {
        if err.is_timeout() {
            LaunchError::Timeout(self.config.timeout)
        } else {
            LaunchError::Request(err)
        }
    }
}

impl Launcher for HttpLauncher {
    async fn launch(&self, lobby_id: &LobbyId) -> Result<Vec<u8>, LaunchError> {
        tracing::info!(%lobby_id, endpoint = %self.config.endpoint, "requesting game server");

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&LaunchRequest {
                match_id: lobby_id.clone(),
            })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(LaunchError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        tracing::debug!(%lobby_id, bytes = body.len(), "game server provisioned");
        Ok(body.to_vec())
    }
}
