//! Client-side caches for the gradebook collections.
//!
//! Each store owns the last server-confirmed snapshot of one remote
//! collection and publishes it through a `tokio::sync::watch` channel:
//!
//! - `EntityStore<E>`: lazy fetch with in-flight de-duplication, force
//!   refresh, and create/update/remove applied after server confirmation
//! - `GradeStore`: an `EntityStore<Grade>` whose view is bound to one filter
//! - `ReportStore`: the read-only aggregate report
//! - `StoreRegistry`: one shared store per kind, plus concurrent preload

mod entity;
mod entity_store;
mod grades;
mod registry;
mod report;
mod state;

#[cfg(test)]
mod testing;

pub use entity::{Entity, Scope};
pub use entity_store::{EntityStore, StoreState};
pub use grades::GradeStore;
pub use registry::{Gateways, StoreRegistry};
pub use report::{ReportState, ReportStore};
pub use state::{FetchOutcome, LoadStatus};
