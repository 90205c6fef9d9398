//! Core reconciliation engine for Trophynote
//!
//! This crate contains:
//! - The canonical record model (source games, destination rows)
//! - Normalization from raw Steam / Notion payloads
//! - The reconciler that plans creates and updates
//! - The sync driver and the boundary traits its collaborators implement
//! - Error types

pub mod error;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod sync;

pub use error::*;
pub use models::*;
pub use normalize::*;
pub use reconcile::*;
pub use sync::*;
