//! Adapters from raw Steam and Notion payloads into the canonical model.
//!
//! Source payloads tolerate missing optional fields (they default to zero
//! values) but not a missing identifier. Destination payloads were written
//! by this same system, so only their identity fields are checked.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use crate::error::{Result, SyncError};
use crate::models::{Achievement, Game, Row};

/// Fixed reference timezone for rendering "last played" to the store.
pub const REFERENCE_TZ: Tz = chrono_tz::America::New_York;

const ICON_BASE: &str = "http://media.steampowered.com/steamcommunity/public/images/apps";
const COVER_BASE: &str = "https://steamcdn-a.akamaihd.net/steam/apps";

/// Renders an instant in the reference timezone for the destination store.
pub fn to_reference_zone(dt: DateTime<Utc>) -> DateTime<Tz> {
    dt.with_timezone(&REFERENCE_TZ)
}

fn truncate_to_minute(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

fn epoch_to_utc(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn u32_field(raw: &Value, key: &str) -> u32 {
    raw[key].as_u64().unwrap_or(0) as u32
}

/// Builds a canonical [`Game`] from one raw Steam mapping. The mapping is
/// the owned-games entry, with `gameName` and the achievements array merged
/// in by the client for played games. Unknown keys are ignored.
pub fn normalize_game(raw: &Value) -> Result<Game> {
    let appid = match &raw["appid"] {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            return Err(SyncError::MalformedRecord(
                "source game is missing its appid".to_string(),
            ))
        }
    };

    let name = raw["name"].as_str().unwrap_or_default().to_string();

    let last_played = truncate_to_minute(epoch_to_utc(
        raw["rtime_last_played"].as_i64().unwrap_or(0),
    ));

    let achievements = match raw["achievements"].as_array() {
        Some(arr) => arr
            .iter()
            .map(normalize_achievement)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    let icon_hash = raw["img_icon_url"].as_str().unwrap_or_default();
    let icon_url = if icon_hash.is_empty() {
        String::new()
    } else {
        format!("{}/{}/{}.jpg", ICON_BASE, appid, icon_hash)
    };
    let cover_url = format!("{}/{}/header.jpg", COVER_BASE, appid);

    Ok(Game {
        appid,
        name,
        playtime_forever: u32_field(raw, "playtime_forever"),
        playtime_windows_forever: u32_field(raw, "playtime_windows_forever"),
        playtime_mac_forever: u32_field(raw, "playtime_mac_forever"),
        playtime_linux_forever: u32_field(raw, "playtime_linux_forever"),
        playtime_2weeks: u32_field(raw, "playtime_2weeks"),
        last_played,
        achievements,
        icon_url,
        cover_url,
    })
}

/// Builds one [`Achievement`] from a raw Steam entry. Steam sends
/// `achieved` as 0/1 and an `unlocktime` of 0 for locked achievements.
pub fn normalize_achievement(raw: &Value) -> Result<Achievement> {
    let api_name = raw["apiname"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            SyncError::MalformedRecord("achievement is missing its apiname".to_string())
        })?
        .to_string();

    let achieved =
        raw["achieved"].as_u64().unwrap_or(0) == 1 || raw["achieved"].as_bool().unwrap_or(false);

    let unlocked_at = if achieved {
        match raw["unlocktime"].as_i64() {
            Some(secs) if secs > 0 => Some(epoch_to_utc(secs)),
            _ => None,
        }
    } else {
        None
    };

    Ok(Achievement {
        api_name,
        achieved,
        unlocked_at,
    })
}

fn store_date(raw: &Value) -> DateTime<Utc> {
    raw.as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| truncate_to_minute(d.with_timezone(&Utc)))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn external_url(raw: &Value) -> String {
    raw["external"]["url"].as_str().unwrap_or_default().to_string()
}

/// Builds a canonical [`Row`] from one raw Notion page. A missing page id,
/// `appid`, or `Name` makes reconciliation unsound and is an error; every
/// other property falls back to its zero value.
pub fn normalize_row(raw: &Value) -> Result<Row> {
    let row_id = raw["id"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            SyncError::MalformedRecord("destination row is missing its page id".to_string())
        })?
        .to_string();

    let props = &raw["properties"];

    let game_id = props["appid"]["rich_text"][0]["plain_text"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            SyncError::MalformedRecord(format!("destination row {} is missing its appid", row_id))
        })?
        .to_string();

    let name = props["Name"]["title"][0]["plain_text"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            SyncError::MalformedRecord(format!("destination row {} is missing its name", row_id))
        })?
        .to_string();

    Ok(Row {
        row_id,
        game_id,
        name,
        last_played: store_date(&props["Last Played"]["date"]["start"]),
        completed_count: props["Achievements Completed"]["number"].as_u64().unwrap_or(0) as u32,
        total_count: props["Total Achievements"]["number"].as_u64().unwrap_or(0) as u32,
        is_perfect: props["Perfect Game"]["checkbox"].as_bool().unwrap_or(false),
        was_perfect: props["Was Perfect"]["checkbox"].as_bool().unwrap_or(false),
        playtime_minutes: props["Playtime Duration"]["number"].as_u64().unwrap_or(0) as u32,
        icon_url: external_url(&raw["icon"]),
        cover_url: external_url(&raw["cover"]),
        last_edited_at: store_date(&props["Last edited time"]["last_edited_time"]),
    })
}
