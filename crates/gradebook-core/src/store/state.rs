//! Load bookkeeping shared by every store.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::api::{describe_error, GatewayError};
use crate::utils::age_display;

/// What a `fetch` call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A list request went out and its result replaced the cache.
    Fetched,
    /// The cached view was valid; nothing was requested.
    CacheHit,
    /// Another fetch of the same store was in flight; nothing was requested.
    InFlight,
}

impl FetchOutcome {
    pub fn fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStatus {
    /// True while a fetch is in flight.
    pub loading: bool,
    /// True once any fetch has succeeded.
    pub initialized: bool,
    /// Normalized message of the most recent failure.
    pub last_error: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl LoadStatus {
    /// Decide whether a fetch should go out, claiming `loading` if so.
    fn begin(&mut self, force: bool, scope_matches: bool) -> Option<FetchOutcome> {
        if self.loading {
            return Some(FetchOutcome::InFlight);
        }
        if self.initialized && !force && scope_matches {
            return Some(FetchOutcome::CacheHit);
        }
        self.loading = true;
        None
    }

    pub(crate) fn succeed(&mut self) {
        self.initialized = true;
        self.last_error = None;
        self.fetched_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, err: &GatewayError) {
        self.last_error = Some(describe_error(err));
    }

    /// "just now", "5m ago", or "never" before the first fetch.
    pub fn age_display(&self) -> String {
        self.fetched_at
            .map(age_display)
            .unwrap_or_else(|| "never".to_string())
    }
}

/// State published through a store's watch channel.
pub(crate) trait Tracked: Send + Sync + 'static {
    fn status(&self) -> &LoadStatus;
    fn status_mut(&mut self) -> &mut LoadStatus;
}

/// Claim the store's fetch slot.
///
/// Returns the no-op outcome when no request should be issued, or a guard
/// that releases `loading` when dropped, whether the fetch succeeded,
/// failed, or its future was abandoned.
pub(crate) fn begin_fetch<S: Tracked>(
    state: &watch::Sender<S>,
    force: bool,
    scope_matches: impl FnOnce(&S) -> bool,
) -> Result<LoadingGuard<'_, S>, FetchOutcome> {
    let mut skipped = None;
    state.send_if_modified(|s| {
        let matches = scope_matches(s);
        skipped = s.status_mut().begin(force, matches);
        skipped.is_none()
    });
    match skipped {
        Some(outcome) => Err(outcome),
        None => Ok(LoadingGuard { state }),
    }
}

pub(crate) struct LoadingGuard<'a, S: Tracked> {
    state: &'a watch::Sender<S>,
}

impl<S: Tracked> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.status_mut().loading = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        status: LoadStatus,
    }

    impl Tracked for Probe {
        fn status(&self) -> &LoadStatus {
            &self.status
        }

        fn status_mut(&mut self) -> &mut LoadStatus {
            &mut self.status
        }
    }

    #[test]
    fn test_begin_rules() {
        let mut status = LoadStatus::default();
        assert_eq!(status.begin(false, true), None);
        assert!(status.loading);
        assert_eq!(status.begin(true, false), Some(FetchOutcome::InFlight));

        status.loading = false;
        status.succeed();
        assert_eq!(status.begin(false, true), Some(FetchOutcome::CacheHit));
        assert_eq!(status.begin(false, false), None);
        status.loading = false;
        assert_eq!(status.begin(true, true), None);
    }

    #[test]
    fn test_guard_releases_loading() {
        let (tx, _rx) = watch::channel(Probe::default());
        {
            let guard = begin_fetch(&tx, false, |_| true);
            assert!(guard.is_ok());
            assert!(tx.borrow().status().loading);
            assert_eq!(
                begin_fetch(&tx, true, |_| true).err(),
                Some(FetchOutcome::InFlight)
            );
        }
        assert!(!tx.borrow().status().loading);
    }

    #[test]
    fn test_fail_records_normalized_message() {
        let mut status = LoadStatus::default();
        status.fail(&GatewayError::from_status(500, ""));
        assert_eq!(status.last_error.as_deref(), Some("Request failed (500)"));
        assert_eq!(status.age_display(), "never");
        status.succeed();
        assert_eq!(status.last_error, None);
        assert_eq!(status.age_display(), "just now");
    }
}
