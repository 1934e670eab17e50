use std::sync::Arc;

use tokio::sync::watch;

use super::entity_store::{EntityStore, StoreState};
use super::state::FetchOutcome;
use crate::api::{EntityGateway, GatewayError};
use crate::models::{Grade, GradeKey, GradePayload, GradeQuery, GradeUpdatePayload};

/// Grade cache scoped to one filter at a time.
///
/// Holds exactly one filtered view: fetching under different filters evicts
/// the previous view instead of keeping per-filter sub-caches. Writes whose
/// result falls outside the current filters reach the server but are not
/// shown.
pub struct GradeStore {
    grades: EntityStore<Grade>,
}

impl GradeStore {
    pub fn new(gateway: Arc<dyn EntityGateway<Grade>>) -> Self {
        Self {
            grades: EntityStore::new(gateway),
        }
    }

    /// Load grades matching `filters`.
    ///
    /// No request is made when the view was already loaded under exactly the
    /// same filters and `force` is false.
    pub async fn fetch(&self, filters: GradeQuery, force: bool) -> Result<FetchOutcome, GatewayError> {
        self.grades.fetch_scoped(filters, force).await
    }

    pub async fn create(&self, payload: GradePayload) -> Result<Grade, GatewayError> {
        self.grades.create(payload).await
    }

    /// Change a grade. A grade already in the view is always replaced, even if
    /// the current filters would not admit the new version.
    pub async fn update(
        &self,
        student_id: i64,
        exam_id: i64,
        payload: GradeUpdatePayload,
    ) -> Result<Grade, GatewayError> {
        self.grades
            .update(GradeKey::new(student_id, exam_id), payload)
            .await
    }

    pub async fn remove(&self, student_id: i64, exam_id: i64) -> Result<(), GatewayError> {
        self.grades.remove(GradeKey::new(student_id, exam_id)).await
    }

    pub fn clear_error(&self) {
        self.grades.clear_error();
    }

    // ===== Reads =====

    /// Filters of the last successful fetch.
    pub fn last_filters(&self) -> GradeQuery {
        self.grades.scope()
    }

    pub fn items(&self) -> Vec<Grade> {
        self.grades.items()
    }

    pub fn total(&self) -> usize {
        self.grades.total()
    }

    pub fn find(&self, student_id: i64, exam_id: i64) -> Option<Grade> {
        self.grades.find(&GradeKey::new(student_id, exam_id))
    }

    pub fn for_student(&self, student_id: i64) -> Vec<Grade> {
        self.grades.filter(|g| g.student_id == student_id)
    }

    pub fn for_exam(&self, exam_id: i64) -> Vec<Grade> {
        self.grades.filter(|g| g.exam_id == exam_id)
    }

    pub fn is_loading(&self) -> bool {
        self.grades.is_loading()
    }

    pub fn is_initialized(&self) -> bool {
        self.grades.is_initialized()
    }

    pub fn last_error(&self) -> Option<String> {
        self.grades.last_error()
    }

    pub fn age_display(&self) -> String {
        self.grades.age_display()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState<Grade>> {
        self.grades.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{grade, ScriptedGateway};

    fn keys(store: &GradeStore) -> Vec<(i64, i64)> {
        store
            .items()
            .iter()
            .map(|g| (g.student_id, g.exam_id))
            .collect()
    }

    fn payload(student_id: i64, exam_id: i64) -> GradePayload {
        GradePayload {
            student_id,
            exam_id,
            value: 6.0,
            note: None,
        }
    }

    fn update_payload(value: f64) -> GradeUpdatePayload {
        GradeUpdatePayload { value, note: None }
    }

    #[tokio::test]
    async fn test_same_filters_hit_cache() {
        let gateway = ScriptedGateway::<Grade>::new();
        gateway.push_list(Ok(vec![grade(1, 5, 7.0), grade(2, 5, 8.0)]));
        let store = GradeStore::new(gateway.clone());

        let first = store.fetch(GradeQuery::for_exam(5), false).await.unwrap();
        let second = store.fetch(GradeQuery::for_exam(5), false).await.unwrap();
        assert_eq!(first, FetchOutcome::Fetched);
        assert_eq!(second, FetchOutcome::CacheHit);
        assert_eq!(gateway.list_calls(), 1);
        assert_eq!(store.last_filters(), GradeQuery::for_exam(5));
    }

    #[tokio::test]
    async fn test_filter_change_replaces_view() {
        let gateway = ScriptedGateway::<Grade>::new();
        gateway.push_list(Ok(vec![grade(1, 5, 7.0), grade(2, 5, 8.0)]));
        gateway.push_list(Ok(vec![grade(3, 7, 9.0)]));
        let store = GradeStore::new(gateway.clone());

        store.fetch(GradeQuery::for_exam(5), false).await.unwrap();
        let outcome = store.fetch(GradeQuery::for_exam(7), false).await.unwrap();
        assert!(outcome.fetched());
        assert_eq!(keys(&store), vec![(3, 7)]);
        assert_eq!(store.last_filters(), GradeQuery::for_exam(7));
        assert_eq!(
            gateway.requested_scopes(),
            vec![GradeQuery::for_exam(5), GradeQuery::for_exam(7)]
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_filters() {
        let gateway = ScriptedGateway::<Grade>::new();
        gateway.push_list(Ok(vec![grade(1, 5, 7.0)]));
        gateway.push_list(Err(GatewayError::network("timed out")));
        let store = GradeStore::new(gateway.clone());

        store.fetch(GradeQuery::for_exam(5), false).await.unwrap();
        assert!(store.fetch(GradeQuery::for_exam(7), false).await.is_err());
        assert_eq!(store.last_filters(), GradeQuery::for_exam(5));
        assert_eq!(keys(&store), vec![(1, 5)]);
        assert_eq!(store.last_error().as_deref(), Some("timed out"));
    }

    #[tokio::test]
    async fn test_create_outside_filters_not_shown() {
        let gateway = ScriptedGateway::<Grade>::new();
        gateway.push_list(Ok(vec![grade(3, 1, 5.0)]));
        gateway.push_create(Ok(grade(9, 1, 6.0)));
        let store = GradeStore::new(gateway.clone());
        store.fetch(GradeQuery::for_student(3), false).await.unwrap();

        let created = store.create(payload(9, 1)).await.unwrap();
        assert_eq!(created.student_id, 9);
        assert_eq!(keys(&store), vec![(3, 1)]);
    }

    #[tokio::test]
    async fn test_create_inside_filters_shown_in_order() {
        let gateway = ScriptedGateway::<Grade>::new();
        gateway.push_list(Ok(vec![grade(3, 1, 5.0)]));
        gateway.push_create(Ok(grade(3, 4, 6.0)));
        let store = GradeStore::new(gateway.clone());
        store.fetch(GradeQuery::for_student(3), false).await.unwrap();

        store.create(payload(3, 4)).await.unwrap();
        assert_eq!(keys(&store), vec![(3, 4), (3, 1)]);
    }

    #[tokio::test]
    async fn test_update_of_present_grade_always_applies() {
        let gateway = ScriptedGateway::<Grade>::new();
        gateway.push_list(Ok(vec![grade(3, 1, 5.0)]));
        gateway.push_update(Ok(grade(3, 1, 9.5)));
        let store = GradeStore::new(gateway.clone());
        store.fetch(GradeQuery::for_student(3), false).await.unwrap();

        store.update(3, 1, update_payload(9.5)).await.unwrap();
        assert_eq!(store.find(3, 1).map(|g| g.value), Some(9.5));
        assert_eq!(store.total(), 1);
    }

    #[tokio::test]
    async fn test_update_of_absent_grade_respects_filters() {
        let gateway = ScriptedGateway::<Grade>::new();
        gateway.push_list(Ok(vec![grade(3, 1, 5.0)]));
        gateway.push_update(Ok(grade(8, 1, 7.0)));
        gateway.push_update(Ok(grade(3, 2, 7.0)));
        let store = GradeStore::new(gateway.clone());
        store.fetch(GradeQuery::for_student(3), false).await.unwrap();

        store.update(8, 1, update_payload(7.0)).await.unwrap();
        assert!(store.find(8, 1).is_none());

        store.update(3, 2, update_payload(7.0)).await.unwrap();
        assert_eq!(keys(&store), vec![(3, 2), (3, 1)]);
        assert_eq!(store.for_student(3).len(), 2);
        assert_eq!(store.for_exam(2).len(), 1);
    }

    #[tokio::test]
    async fn test_remove_by_composite_key() {
        let gateway = ScriptedGateway::<Grade>::new();
        gateway.push_list(Ok(vec![grade(1, 5, 7.0), grade(2, 5, 8.0)]));
        gateway.push_delete(Ok(()));
        let store = GradeStore::new(gateway.clone());
        store.fetch(GradeQuery::default(), false).await.unwrap();

        store.remove(1, 5).await.unwrap();
        assert_eq!(keys(&store), vec![(2, 5)]);
    }

    #[tokio::test]
    async fn test_unfiltered_first_fetch_requests() {
        let gateway = ScriptedGateway::<Grade>::new();
        gateway.push_list(Ok(vec![]));
        let store = GradeStore::new(gateway.clone());

        let outcome = store.fetch(GradeQuery::default(), false).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Fetched);
        assert!(store.is_initialized());
        assert_eq!(store.total(), 0);
    }
}
