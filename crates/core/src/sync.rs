//! One full sync pass: fetch, reconcile, commit, report.

use tracing::info;

use crate::error::Result;
use crate::models::{Game, Row};
use crate::reconcile::reconcile;

/// Produces the source-side records for one pass. A fetch failure is fatal
/// to the run.
pub trait SourceCatalog {
    fn fetch_games(&self) -> Result<Vec<Game>>;
}

/// The destination store boundary. `fetch_rows` materializes every row the
/// store holds (pagination is the implementation's concern). Creates and
/// updates are best-effort: implementations log individual failures and
/// keep going with the rest of the batch.
pub trait RecordStore {
    fn fetch_rows(&self) -> Result<Vec<Row>>;
    fn create_rows(&self, games: &[Game]);
    fn update_rows(&self, rows: &[Row]);
}

/// Counts from one completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl SyncReport {
    /// Distinguishes a pass that touched the store from a clean no-op run.
    pub fn did_work(&self) -> bool {
        self.created > 0 || self.updated > 0
    }
}

/// Runs one synchronous pass to completion. No retries, no partial
/// restarts; an individual create/update failure is the store boundary's
/// to log, a fetch failure aborts the run.
pub fn run_sync<S: SourceCatalog, D: RecordStore>(catalog: &S, store: &D) -> Result<SyncReport> {
    let games = catalog.fetch_games()?;
    for game in &games {
        info!("{}", game.status_text());
    }

    let rows = store.fetch_rows()?;
    let plan = reconcile(&games, &rows);

    if !plan.create.is_empty() {
        info!("{} new rows to create", plan.create.len());
        store.create_rows(&plan.create);
    }
    if !plan.update.is_empty() {
        info!("{} rows to update", plan.update.len());
        store.update_rows(&plan.update);
    }
    if plan.is_empty() {
        info!("nothing to sync");
    }

    Ok(SyncReport {
        created: plan.create.len(),
        updated: plan.update.len(),
        unchanged: plan.unchanged,
    })
}
