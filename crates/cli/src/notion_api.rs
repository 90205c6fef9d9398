//! Notion API client: database query with cursor pagination, page create
//! and update in the property shape the normalizer reads back.

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{error, info};
use trophynote_core::{
    normalize_row, to_reference_zone, Game, RecordStore, Result, Row, SyncError,
};

use crate::config::Config;

const API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

pub struct NotionClient {
    client: reqwest::blocking::Client,
    api_key: String,
    database_id: String,
}

impl NotionClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: config.notion_api_key.clone(),
            database_id: config.notion_database_id.clone(),
        }
    }

    fn request(&self, method: Method, url: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .map_err(|e| SyncError::Notion(e.to_string()))?;
        response
            .json()
            .map_err(|e| SyncError::Notion(e.to_string()))
    }

    /// Walks the query cursor until the store reports no next page,
    /// materializing every row. An error reply aborts the fetch; creates
    /// are best-effort, reads are not.
    fn query_pages(&self) -> Result<Vec<Value>> {
        let url = format!("{}/databases/{}/query", API_BASE, self.database_id);
        let mut pages = Vec::new();
        let mut start_cursor: Option<String> = None;
        loop {
            let mut body = json!({ "page_size": 100 });
            if let Some(cursor) = &start_cursor {
                body["start_cursor"] = json!(cursor);
            }
            let response = self.request(Method::POST, &url, &body)?;
            match drain_query_reply(response, &mut pages)? {
                Some(cursor) => start_cursor = Some(cursor),
                None => break,
            }
        }
        Ok(pages)
    }

    fn game_properties(game: &Game) -> Value {
        json!({
            "Name": {
                "title": [{
                    "type": "text",
                    "text": { "content": game.name.clone(), "link": null },
                }]
            },
            "appid": {
                "rich_text": [{
                    "type": "text",
                    "text": { "content": game.appid.clone(), "link": null },
                }]
            },
            "Achievements Completed": { "number": game.completed_count() },
            "Total Achievements": { "number": game.total_count() },
            "Last Played": {
                "date": { "start": to_reference_zone(game.last_played).to_rfc3339() }
            },
            "Perfect Game": { "checkbox": game.is_perfect() },
            "Was Perfect": { "checkbox": false },
            "Playtime Duration": { "number": game.playtime_forever },
        })
    }

    fn row_properties(row: &Row) -> Value {
        json!({
            "Name": {
                "title": [{
                    "type": "text",
                    "text": { "content": row.name.clone(), "link": null },
                }]
            },
            "appid": {
                "rich_text": [{
                    "type": "text",
                    "text": { "content": row.game_id.clone(), "link": null },
                }]
            },
            "Achievements Completed": { "number": row.completed_count },
            "Total Achievements": { "number": row.total_count },
            "Last Played": {
                "date": { "start": to_reference_zone(row.last_played).to_rfc3339() }
            },
            "Perfect Game": { "checkbox": row.is_perfect },
            "Was Perfect": { "checkbox": row.was_perfect },
        })
    }

    fn attach_assets(body: &mut Value, icon_url: &str, cover_url: &str) {
        if !icon_url.is_empty() {
            body["icon"] = json!({ "type": "external", "external": { "url": icon_url } });
        }
        if !cover_url.is_empty() {
            body["cover"] = json!({ "type": "external", "external": { "url": cover_url } });
        }
    }
}

/// Notion reports request-level failures in the response body.
fn is_error_reply(response: &Value) -> bool {
    response["object"].as_str() == Some("error")
}

/// Appends one query reply's results and hands back the next cursor, or
/// fails the fetch when the store reports an error instead of a page.
fn drain_query_reply(response: Value, pages: &mut Vec<Value>) -> Result<Option<String>> {
    if is_error_reply(&response) {
        return Err(SyncError::Notion(response.to_string()));
    }
    if let Some(results) = response["results"].as_array() {
        pages.extend(results.iter().cloned());
    }
    Ok(response["next_cursor"].as_str().map(String::from))
}

impl RecordStore for NotionClient {
    fn fetch_rows(&self) -> Result<Vec<Row>> {
        self.query_pages()?.iter().map(normalize_row).collect()
    }

    fn create_rows(&self, games: &[Game]) {
        let url = format!("{}/pages", API_BASE);
        let mut created = 0;
        for game in games {
            let mut body = json!({
                "parent": { "database_id": self.database_id.clone() },
                "properties": Self::game_properties(game),
            });
            Self::attach_assets(&mut body, &game.icon_url, &game.cover_url);

            match self.request(Method::POST, &url, &body) {
                Ok(response) if is_error_reply(&response) => {
                    error!("error creating row for appid {}: {}", game.appid, response);
                }
                Ok(_) => created += 1,
                Err(e) => error!("error creating row for appid {}: {}", game.appid, e),
            }
        }
        info!("created {} rows", created);
    }

    fn update_rows(&self, rows: &[Row]) {
        let mut updated = 0;
        for row in rows {
            let url = format!("{}/pages/{}", API_BASE, row.row_id);
            let mut body = json!({ "properties": Self::row_properties(row) });
            Self::attach_assets(&mut body, &row.icon_url, &row.cover_url);

            match self.request(Method::PATCH, &url, &body) {
                Ok(response) if is_error_reply(&response) => {
                    error!("error updating row {}: {}", row.row_id, response);
                }
                Ok(_) => updated += 1,
                Err(e) => error!("error updating row {}: {}", row.row_id, e),
            }
        }
        info!("updated {} rows", updated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_reply_fails_the_fetch() {
        let reply = json!({
            "object": "error",
            "status": 429,
            "code": "rate_limited",
            "message": "Rate limited, retry later.",
        });
        let mut pages = Vec::new();

        let err = drain_query_reply(reply, &mut pages).unwrap_err();
        assert!(matches!(err, SyncError::Notion(_)));
        assert!(pages.is_empty());
    }

    #[test]
    fn query_results_accumulate_until_the_cursor_ends() {
        let mut pages = Vec::new();

        let first = json!({
            "object": "list",
            "results": [{ "id": "page-a" }],
            "next_cursor": "cur-1",
        });
        let cursor = drain_query_reply(first, &mut pages).unwrap();
        assert_eq!(cursor.as_deref(), Some("cur-1"));

        let last = json!({
            "object": "list",
            "results": [{ "id": "page-b" }],
            "next_cursor": null,
        });
        let cursor = drain_query_reply(last, &mut pages).unwrap();
        assert!(cursor.is_none());
        assert_eq!(pages.len(), 2);
    }
}
