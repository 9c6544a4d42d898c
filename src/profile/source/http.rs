//! HTTP Data Source
//!
//! JSON client for the upstream profile API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::trace;

use super::{ArenaLineup, DataSource, SourceError};
use crate::profile::{Character, CharacterStats, PlayerKey, Ship};

/// Fetches profile pieces from `{base}/players/{key}/...`.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: Client,
    base_url: Url,
}

impl HttpDataSource {
    /// Creates a client rooted at `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = Url::parse(base_url).map_err(|e| SourceError::Url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::Url(base_url.to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("profile_cache/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, player: &PlayerKey, tail: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SourceError::Url(self.base_url.to_string()))?;
            segments
                .pop_if_empty()
                .extend(["players", player.as_str()])
                .extend(tail);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        trace!(%url, "Fetching upstream");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_arena_lineup(&self, player: &PlayerKey) -> Result<ArenaLineup, SourceError> {
        self.get_json(self.endpoint(player, &["arena"])?).await
    }

    async fn fetch_collection(&self, player: &PlayerKey) -> Result<Vec<Character>, SourceError> {
        self.get_json(self.endpoint(player, &["collection"])?).await
    }

    async fn fetch_ships(&self, player: &PlayerKey) -> Result<Vec<Ship>, SourceError> {
        self.get_json(self.endpoint(player, &["ships"])?).await
    }

    async fn fetch_character_detail(
        &self,
        player: &PlayerKey,
        character: &str,
    ) -> Result<CharacterStats, SourceError> {
        self.get_json(self.endpoint(player, &["characters", character])?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route(
                "/players/:player/arena",
                get(|Path(player): Path<String>| async move {
                    Json(json!({
                        "lineup": [{"name": format!("{player}-lead"), "speed": 300}],
                        "last_update": "2024-03-01T12:00:00Z"
                    }))
                }),
            )
            .route(
                "/players/:player/collection",
                get(|| async { Json(json!([{"name": "Rey", "stars": 7}])) }),
            )
            .route(
                "/players/:player/ships",
                get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
            )
            .route(
                "/players/:player/characters/:name",
                get(|Path((_, name)): Path<(String, String)>| async move {
                    Json(json!({"name": name, "stars": 7, "health": 40000}))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_fetch_arena_lineup() {
        let base = spawn_upstream().await;
        let source = HttpDataSource::new(&base, Duration::from_secs(5)).unwrap();
        let player = PlayerKey::parse("ronoaldo").unwrap();

        let arena = source.fetch_arena_lineup(&player).await.unwrap();
        assert_eq!(arena.lineup.len(), 1);
        assert_eq!(arena.lineup[0].name, "ronoaldo-lead");
        assert_eq!(arena.last_update.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[tokio::test]
    async fn test_fetch_character_detail_escapes_names() {
        let base = spawn_upstream().await;
        let source = HttpDataSource::new(&base, Duration::from_secs(5)).unwrap();
        let player = PlayerKey::parse("Some Player").unwrap();

        let stats = source
            .fetch_character_detail(&player, "Darth Vader")
            .await
            .unwrap();
        assert_eq!(stats.name, "Darth Vader");
        assert_eq!(stats.health, 40000);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let base = spawn_upstream().await;
        let source = HttpDataSource::new(&base, Duration::from_secs(5)).unwrap();
        let player = PlayerKey::parse("ronoaldo").unwrap();

        let result = source.fetch_ships(&player).await;
        assert!(matches!(result, Err(SourceError::Status(503))));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = HttpDataSource::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(SourceError::Url(_))));
    }
}
