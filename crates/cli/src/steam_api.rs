//! Steam Web API client: owned games plus per-game achievement progress.

use serde_json::Value;
use tracing::info;
use trophynote_core::{normalize_game, Game, Result, SourceCatalog, SyncError};

use crate::config::Config;

const API_OWNED_GAMES: &str = "http://api.steampowered.com/IPlayerService/GetOwnedGames/v0001/";
const API_ACHIEVEMENTS: &str =
    "http://api.steampowered.com/ISteamUserStats/GetPlayerAchievements/v0001/";

pub struct SteamClient {
    client: reqwest::blocking::Client,
    api_key: String,
    steam_id: String,
}

impl SteamClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: config.steam_api_key.clone(),
            steam_id: config.steam_id.clone(),
        }
    }

    fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .map_err(|e| SyncError::SteamApi(e.to_string()))?;
        response
            .json()
            .map_err(|e| SyncError::SteamApi(e.to_string()))
    }

    /// Fetches the owned-games list, then merges the achievement progress
    /// and proper game name into each played game's raw mapping. Games the
    /// stats endpoint knows nothing about keep their bare owned-games entry.
    fn fetch_raw_games(&self) -> Result<Vec<Value>> {
        info!("fetching game data from Steam");
        let body = self.get_json(
            API_OWNED_GAMES,
            &[
                ("key", self.api_key.as_str()),
                ("steamid", self.steam_id.as_str()),
                ("include_appinfo", "1"),
            ],
        )?;

        let mut raw_games = owned_games_list(&body)?;
        info!("found {} games", raw_games.len());

        for raw in &mut raw_games {
            // Only look up games that have actually been played.
            if raw["playtime_forever"].as_u64().unwrap_or(0) == 0 {
                continue;
            }
            let appid = match &raw["appid"] {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => continue,
            };

            info!("looking up achievements for appid {}", appid);
            let stats = self.get_json(
                API_ACHIEVEMENTS,
                &[
                    ("key", self.api_key.as_str()),
                    ("steamid", self.steam_id.as_str()),
                    ("appid", appid.as_str()),
                ],
            )?;

            let playerstats = &stats["playerstats"];
            if playerstats["success"].as_bool() == Some(false) {
                info!("no stats for appid {}", appid);
                continue;
            }
            if let Some(game_name) = playerstats["gameName"].as_str() {
                raw["name"] = Value::String(game_name.to_string());
            }
            match playerstats["achievements"].as_array() {
                Some(list) => raw["achievements"] = Value::Array(list.clone()),
                None => info!(
                    "{} does not have achievements",
                    raw["name"].as_str().unwrap_or(appid.as_str())
                ),
            }
        }

        Ok(raw_games)
    }
}

impl SourceCatalog for SteamClient {
    fn fetch_games(&self) -> Result<Vec<Game>> {
        self.fetch_raw_games()?.iter().map(normalize_game).collect()
    }
}

/// Pulls the games array out of the owned-games reply. A body without the
/// `response` payload is a failed fetch, not an empty library; a present
/// payload with no `games` array is how Steam reports an empty one.
fn owned_games_list(body: &Value) -> Result<Vec<Value>> {
    if body["response"].is_null() {
        return Err(SyncError::SteamApi(
            "owned games reply is missing its response payload".to_string(),
        ));
    }
    Ok(body["response"]["games"]
        .as_array()
        .cloned()
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_without_a_response_payload_is_an_error() {
        let err = owned_games_list(&json!({})).unwrap_err();
        assert!(matches!(err, SyncError::SteamApi(_)));
    }

    #[test]
    fn empty_library_reply_yields_no_games() {
        let games =
            owned_games_list(&json!({ "response": { "game_count": 0, "games": [] } })).unwrap();
        assert!(games.is_empty());

        // Private profiles come back with a bare response object.
        let games = owned_games_list(&json!({ "response": {} })).unwrap();
        assert!(games.is_empty());
    }

    #[test]
    fn games_array_passes_through_untouched() {
        let body = json!({
            "response": {
                "game_count": 1,
                "games": [{ "appid": 70, "name": "Half-Life", "playtime_forever": 30 }],
            }
        });
        let games = owned_games_list(&body).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0]["appid"], 70);
    }
}
