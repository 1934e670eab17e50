use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::entity::{Entity, Scope};
use super::state::{begin_fetch, FetchOutcome, LoadStatus, Tracked};
use crate::api::{EntityGateway, GatewayError};

/// Snapshot of one store, as observed through `EntityStore::subscribe`.
#[derive(Debug, Clone)]
pub struct StoreState<E: Entity> {
    /// Cached records, ordered by `Entity::compare`, one per identity.
    pub items: Vec<E>,
    /// Scope of the last successful fetch.
    pub scope: E::Scope,
    pub status: LoadStatus,
}

impl<E: Entity> Default for StoreState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            scope: E::Scope::default(),
            status: LoadStatus::default(),
        }
    }
}

impl<E: Entity> Tracked for StoreState<E> {
    fn status(&self) -> &LoadStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut LoadStatus {
        &mut self.status
    }
}

impl<E: Entity> StoreState<E> {
    fn sort(&mut self) {
        self.items.sort_by(|a, b| a.compare(b));
    }

    fn position(&self, id: &E::Id) -> Option<usize> {
        self.items.iter().position(|item| &item.id() == id)
    }

    /// Insert a server-confirmed record, replacing any entry with its id.
    fn upsert(&mut self, record: E) {
        match self.position(&record.id()) {
            Some(idx) => self.items[idx] = record,
            None => self.items.push(record),
        }
        self.sort();
    }

    /// Apply an update addressed to `id`.
    ///
    /// A record already in the view is always replaced; one that is not is
    /// only added when the current scope admits it. If the server answers
    /// with a different id, any cached entry under that id is superseded.
    fn apply_update(&mut self, id: &E::Id, record: E) -> bool {
        if self.position(id).is_some() {
            let new_id = record.id();
            if &new_id != id {
                self.items.retain(|item| item.id() != new_id);
            }
            if let Some(idx) = self.position(id) {
                self.items[idx] = record;
            }
            self.sort();
            true
        } else if self.scope.admits(&record) {
            self.upsert(record);
            true
        } else {
            false
        }
    }
}

/// Client-side cache of one remote collection.
///
/// Holds the confirmed server state of the collection in a fixed order and
/// layers list/create/update/delete over an `EntityGateway`. Only one list
/// request is in flight per store at any time; writes are never applied
/// before the server confirms them. Every failure is recorded as the
/// store's `last_error` and returned to the caller.
pub struct EntityStore<E: Entity> {
    gateway: Arc<dyn EntityGateway<E>>,
    state: watch::Sender<StoreState<E>>,
}

impl<E: Entity> EntityStore<E> {
    pub fn new(gateway: Arc<dyn EntityGateway<E>>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self { gateway, state }
    }

    // ===== Reads =====

    /// Receiver that sees every state change of this store.
    pub fn subscribe(&self) -> watch::Receiver<StoreState<E>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> StoreState<E> {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<E> {
        self.state.borrow().items.clone()
    }

    pub fn total(&self) -> usize {
        self.state.borrow().items.len()
    }

    pub fn find(&self, id: &E::Id) -> Option<E> {
        self.state
            .borrow()
            .items
            .iter()
            .find(|item| &item.id() == id)
            .cloned()
    }

    /// Records matching `predicate`, in store order.
    pub fn filter(&self, predicate: impl Fn(&E) -> bool) -> Vec<E> {
        self.state
            .borrow()
            .items
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().status.loading
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().status.initialized
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().status.last_error.clone()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state.borrow().status.fetched_at
    }

    pub fn age_display(&self) -> String {
        self.state.borrow().status.age_display()
    }

    pub fn scope(&self) -> E::Scope {
        self.state.borrow().scope.clone()
    }

    // ===== Operations =====

    /// Load the unscoped collection unless the cache is already valid.
    pub async fn fetch(&self, force: bool) -> Result<FetchOutcome, GatewayError> {
        self.fetch_scoped(E::Scope::default(), force).await
    }

    /// Load the collection narrowed to `scope`.
    ///
    /// The cache counts as valid only for the scope of the last successful
    /// fetch; any other scope (or `force`) replaces the items wholesale.
    pub async fn fetch_scoped(
        &self,
        scope: E::Scope,
        force: bool,
    ) -> Result<FetchOutcome, GatewayError> {
        let _guard = match begin_fetch(&self.state, force, |s| s.scope == scope) {
            Ok(guard) => guard,
            Err(outcome) => {
                debug!(kind = E::KIND, ?outcome, "Fetch skipped");
                return Ok(outcome);
            }
        };

        match self.gateway.list(&scope).await {
            Ok(mut items) => {
                let mut seen = HashSet::new();
                items.retain(|item| seen.insert(item.id()));
                items.sort_by(|a, b| a.compare(b));
                debug!(kind = E::KIND, count = items.len(), ?scope, "Fetched");

                self.state.send_modify(|s| {
                    s.items = items;
                    s.scope = scope;
                    s.status.succeed();
                });
                Ok(FetchOutcome::Fetched)
            }
            Err(err) => {
                warn!(kind = E::KIND, error = %err, "Fetch failed");
                self.record_error(&err);
                Err(err)
            }
        }
    }

    /// Create a record; the server's representation enters the cache if the
    /// current scope admits it.
    pub async fn create(&self, payload: E::Payload) -> Result<E, GatewayError> {
        match self.gateway.create(&payload).await {
            Ok(created) => {
                let shown = self.state.send_if_modified(|s| {
                    if s.scope.admits(&created) {
                        s.upsert(created.clone());
                        true
                    } else {
                        false
                    }
                });
                debug!(kind = E::KIND, id = ?created.id(), shown, "Created");
                Ok(created)
            }
            Err(err) => {
                warn!(kind = E::KIND, error = %err, "Create failed");
                self.record_error(&err);
                Err(err)
            }
        }
    }

    pub async fn update(&self, id: E::Id, payload: E::UpdatePayload) -> Result<E, GatewayError> {
        match self.gateway.update(&id, &payload).await {
            Ok(updated) => {
                let shown = self
                    .state
                    .send_if_modified(|s| s.apply_update(&id, updated.clone()));
                debug!(kind = E::KIND, id = ?id, shown, "Updated");
                Ok(updated)
            }
            Err(err) => {
                warn!(kind = E::KIND, id = ?id, error = %err, "Update failed");
                self.record_error(&err);
                Err(err)
            }
        }
    }

    pub async fn remove(&self, id: E::Id) -> Result<(), GatewayError> {
        match self.gateway.delete(&id).await {
            Ok(()) => {
                self.state.send_if_modified(|s| {
                    let before = s.items.len();
                    s.items.retain(|item| item.id() != id);
                    s.items.len() != before
                });
                debug!(kind = E::KIND, id = ?id, "Removed");
                Ok(())
            }
            Err(err) => {
                warn!(kind = E::KIND, id = ?id, error = %err, "Remove failed");
                self.record_error(&err);
                Err(err)
            }
        }
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.status.last_error.take().is_some());
    }

    fn record_error(&self, err: &GatewayError) {
        self.state.send_modify(|s| s.status.fail(err));
    }
}
