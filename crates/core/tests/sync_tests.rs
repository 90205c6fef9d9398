use std::cell::{Cell, RefCell};

use chrono::{TimeZone, Utc};
use trophynote_core::{run_sync, Achievement, Game, RecordStore, Result, Row, SourceCatalog};

fn game(appid: &str, name: &str, achieved: u32, total: u32) -> Game {
    let achievements = (0..total)
        .map(|i| Achievement {
            api_name: format!("ACH_{}", i),
            achieved: i < achieved,
            unlocked_at: None,
        })
        .collect();
    Game {
        appid: appid.to_string(),
        name: name.to_string(),
        playtime_forever: 300,
        playtime_windows_forever: 0,
        playtime_mac_forever: 0,
        playtime_linux_forever: 0,
        playtime_2weeks: 0,
        last_played: Utc.timestamp_opt(1_700_000_040, 0).unwrap(),
        achievements,
        icon_url: format!("http://icons.example/{}.jpg", appid),
        cover_url: format!("http://covers.example/{}.jpg", appid),
    }
}

struct FakeCatalog {
    games: Vec<Game>,
}

impl SourceCatalog for FakeCatalog {
    fn fetch_games(&self) -> Result<Vec<Game>> {
        Ok(self.games.clone())
    }
}

/// In-memory stand-in for the Notion store: creates assign row ids and
/// mirror the game the way a later fetch would read it back.
struct FakeStore {
    rows: RefCell<Vec<Row>>,
    next_id: Cell<u32>,
}

impl FakeStore {
    fn new(rows: Vec<Row>) -> Self {
        Self {
            next_id: Cell::new(rows.len() as u32),
            rows: RefCell::new(rows),
        }
    }

    fn row_from(&self, game: &Game) -> Row {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Row {
            row_id: format!("row-{}", id),
            game_id: game.appid.clone(),
            name: game.name.clone(),
            last_played: game.last_played,
            completed_count: game.completed_count(),
            total_count: game.total_count(),
            is_perfect: game.is_perfect(),
            was_perfect: false,
            playtime_minutes: game.playtime_forever,
            icon_url: game.icon_url.clone(),
            cover_url: game.cover_url.clone(),
            last_edited_at: game.last_played,
        }
    }
}

impl RecordStore for FakeStore {
    fn fetch_rows(&self) -> Result<Vec<Row>> {
        Ok(self.rows.borrow().clone())
    }

    fn create_rows(&self, games: &[Game]) {
        for g in games {
            let row = self.row_from(g);
            self.rows.borrow_mut().push(row);
        }
    }

    fn update_rows(&self, rows: &[Row]) {
        let mut stored = self.rows.borrow_mut();
        for updated in rows {
            if let Some(slot) = stored.iter_mut().find(|r| r.row_id == updated.row_id) {
                *slot = updated.clone();
            }
        }
    }
}

#[test]
fn first_run_creates_second_run_is_a_no_op() {
    let catalog = FakeCatalog {
        games: vec![game("10", "Game A", 2, 2), game("20", "", 0, 0)],
    };
    let store = FakeStore::new(Vec::new());

    let first = run_sync(&catalog, &store).unwrap();
    assert_eq!(first.created, 1);
    assert_eq!(first.updated, 0);
    assert!(first.did_work());

    let second = run_sync(&catalog, &store).unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 0);
    assert_eq!(second.unchanged, 1);
    assert!(!second.did_work());
}

#[test]
fn progressed_game_updates_then_settles() {
    let stale = {
        let store = FakeStore::new(Vec::new());
        store.create_rows(&[game("10", "Game A", 1, 4)]);
        let rows = store.rows.borrow().clone();
        rows
    };

    let catalog = FakeCatalog {
        games: vec![game("10", "Game A", 3, 4)],
    };
    let store = FakeStore::new(stale);

    let first = run_sync(&catalog, &store).unwrap();
    assert_eq!(first.updated, 1);
    assert_eq!(first.created, 0);

    let second = run_sync(&catalog, &store).unwrap();
    assert!(!second.did_work());
    assert_eq!(second.unchanged, 1);
}

#[test]
fn committed_update_matches_the_staged_row() {
    let store = FakeStore::new(Vec::new());
    store.create_rows(&[game("10", "Game A", 5, 5)]);

    let catalog = FakeCatalog {
        games: vec![game("10", "Game A", 5, 6)],
    };
    run_sync(&catalog, &store).unwrap();

    let rows = store.rows.borrow();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_count, 6);
    assert!(!rows[0].is_perfect);
    assert!(rows[0].was_perfect);
}

#[test]
fn empty_catalog_and_store_report_no_work() {
    let catalog = FakeCatalog { games: Vec::new() };
    let store = FakeStore::new(Vec::new());

    let report = run_sync(&catalog, &store).unwrap();
    assert!(!report.did_work());
    assert_eq!(report.unchanged, 0);
}
