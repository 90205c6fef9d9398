//! The diff engine: pairs source games with destination rows by key and
//! plans the minimal set of creates and updates.

use std::collections::HashMap;

use crate::models::{Game, Row};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub create: Vec<Game>,
    pub update: Vec<Row>,
    /// Matched pairs that needed no action.
    pub unchanged: usize,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty()
    }
}

/// Pure function of its two inputs; never touches the store and never fails
/// on well-formed records. Rows absent from `sources` are left alone, the
/// store is additive only.
///
/// Duplicate keys on either side resolve last-write-wins while building the
/// lookup maps (see DESIGN.md).
pub fn reconcile(sources: &[Game], destinations: &[Row]) -> Plan {
    let rows_by_key: HashMap<&str, &Row> = destinations
        .iter()
        .map(|row| (row.game_id.as_str(), row))
        .collect();

    let mut order: Vec<&str> = Vec::new();
    let mut games_by_key: HashMap<&str, &Game> = HashMap::new();
    for game in sources {
        if games_by_key.insert(game.appid.as_str(), game).is_none() {
            order.push(game.appid.as_str());
        }
    }

    let mut plan = Plan::default();
    for key in order {
        let game = games_by_key[key];
        match rows_by_key.get(key) {
            None => {
                // Never create a placeholder row for an unplayed or
                // achievement-less game.
                if game.is_valid() {
                    plan.create.push(game.clone());
                }
            }
            Some(row) => match diff(game, row) {
                Some(staged) => plan.update.push(staged),
                None => plan.unchanged += 1,
            },
        }
    }
    plan
}

/// Field-level diff in fixed order. Returns the staged row when anything
/// differs, `None` for a pure no-op.
fn diff(game: &Game, row: &Row) -> Option<Row> {
    let mut staged = row.clone();
    let mut changed = false;

    if staged.name != game.name {
        staged.name = game.name.clone();
        changed = true;
    }
    // Both sides are minute-truncated, so plain equality is
    // precision-insensitive.
    if staged.last_played != game.last_played {
        staged.last_played = game.last_played;
        changed = true;
    }
    if staged.completed_count != game.completed_count() {
        staged.completed_count = game.completed_count();
        changed = true;
    }
    if staged.is_perfect != game.is_perfect() {
        staged.is_perfect = game.is_perfect();
        changed = true;
    }
    if staged.total_count != game.total_count() {
        // The achievement catalog for this title changed size since the
        // last sync. A row that demonstrably hit 100% before the goalpost
        // moved keeps that on record: the perfect flag drops and the sticky
        // was-perfect flag raises. Keyed off the row's pre-diff flag, not
        // the staged one.
        if row.is_perfect {
            staged.is_perfect = false;
            staged.was_perfect = true;
        }
        staged.total_count = game.total_count();
        changed = true;
    }

    if changed {
        // Display assets ride along with any substantive update; a pure
        // no-op refreshes nothing.
        staged.icon_url = game.icon_url.clone();
        staged.cover_url = game.cover_url.clone();
        Some(staged)
    } else {
        None
    }
}
