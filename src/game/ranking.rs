//! Client for the similarity-ranking API.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Answer of `GET {base}/game/{gameId}/{word}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ranking {
    /// Word the service ranked; may be empty.
    #[serde(default)]
    pub word: String,
    /// Rank distance; negative when the word is unknown to the model.
    pub distance: i64,
}

/// Failures while querying the ranking service.
#[derive(Debug, Error)]
pub enum RankingError {
    /// The configured base URL cannot carry path segments.
    #[error("invalid ranking API base `{base}`")]
    InvalidBase {
        /// Offending base URL.
        base: String,
    },
    /// The service could not be reached.
    #[error("ranking request failed")]
    Transport(#[source] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("ranking service answered {0}")]
    Status(StatusCode),
    /// The answer was not the expected JSON.
    #[error("failed to decode ranking response")]
    Decode(#[source] reqwest::Error),
}

/// Source of distances for guessed words.
pub trait RankingClient: Send + Sync {
    /// Rank `word` against the secret word of `game_id`.
    fn rank(&self, game_id: u32, word: &str) -> BoxFuture<'static, Result<Ranking, RankingError>>;
}

/// [`RankingClient`] speaking HTTP, either to the proxy or directly upstream.
#[derive(Clone)]
pub struct HttpRankingClient {
    client: Client,
    base: Arc<Url>,
}

impl HttpRankingClient {
    /// Build a client for `base` (e.g. `http://localhost:8080/api`).
    pub fn new(base: &str) -> Result<Self, RankingError> {
        let client = Client::builder().build().map_err(RankingError::Transport)?;
        Self::with_client(client, base)
    }

    /// Build around an existing HTTP client.
    pub fn with_client(client: Client, base: &str) -> Result<Self, RankingError> {
        let invalid = || RankingError::InvalidBase { base: base.into() };
        let url = Url::parse(base).map_err(|_| invalid())?;
        if url.cannot_be_a_base() {
            return Err(invalid());
        }
        Ok(Self {
            client,
            base: Arc::new(url),
        })
    }

    /// URL for ranking `word` in `game_id`; the word is percent-encoded as a path segment.
    pub fn game_url(&self, game_id: u32, word: &str) -> Url {
        let mut url = (*self.base).clone();
        let id = game_id.to_string();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["game", id.as_str(), word]);
        }
        url
    }
}

impl RankingClient for HttpRankingClient {
    fn rank(&self, game_id: u32, word: &str) -> BoxFuture<'static, Result<Ranking, RankingError>> {
        let client = self.client.clone();
        let url = self.game_url(game_id, word);
        Box::pin(async move {
            debug!(%url, "requesting ranking");
            let response = client
                .get(url)
                .send()
                .await
                .map_err(RankingError::Transport)?;
            let status = response.status();
            if !status.is_success() {
                return Err(RankingError::Status(status));
            }
            response.json::<Ranking>().await.map_err(RankingError::Decode)
        })
    }
}
