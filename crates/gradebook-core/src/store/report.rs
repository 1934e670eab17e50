use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::state::{begin_fetch, FetchOutcome, LoadStatus, Tracked};
use crate::api::{GatewayError, ReportGateway};
use crate::models::{AggregateReport, DepartmentPerformance, GradeCoverage, ModalityBalance};

#[derive(Debug, Clone, Default)]
pub struct ReportState {
    /// Last successfully fetched snapshot.
    pub report: Option<AggregateReport>,
    pub status: LoadStatus,
}

impl Tracked for ReportState {
    fn status(&self) -> &LoadStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut LoadStatus {
        &mut self.status
    }
}

/// Cache for the read-only analytical report.
///
/// Follows the same lazy-fetch contract as the entity stores but holds one
/// composite value that is replaced wholesale on every fetch.
pub struct ReportStore {
    gateway: Arc<dyn ReportGateway>,
    state: watch::Sender<ReportState>,
}

impl ReportStore {
    pub fn new(gateway: Arc<dyn ReportGateway>) -> Self {
        let (state, _) = watch::channel(ReportState::default());
        Self { gateway, state }
    }

    pub async fn fetch(&self, force: bool) -> Result<FetchOutcome, GatewayError> {
        let _guard = match begin_fetch(&self.state, force, |_| true) {
            Ok(guard) => guard,
            Err(outcome) => {
                debug!(kind = "report", ?outcome, "Fetch skipped");
                return Ok(outcome);
            }
        };

        match self.gateway.fetch_report().await {
            Ok(report) => {
                debug!(
                    departments = report.department_ranking.len(),
                    modality = report.modality_balance.len(),
                    coverage = report.grade_coverage.len(),
                    "Fetched report"
                );
                self.state.send_modify(|s| {
                    s.report = Some(report);
                    s.status.succeed();
                });
                Ok(FetchOutcome::Fetched)
            }
            Err(err) => {
                warn!(kind = "report", error = %err, "Fetch failed");
                self.state.send_modify(|s| s.status.fail(&err));
                Err(err)
            }
        }
    }

    pub async fn refresh(&self) -> Result<FetchOutcome, GatewayError> {
        self.fetch(true).await
    }

    pub fn clear_error(&self) {
        self.state
            .send_if_modified(|s| s.status.last_error.take().is_some());
    }

    // ===== Reads =====

    pub fn report(&self) -> Option<AggregateReport> {
        self.state.borrow().report.clone()
    }

    pub fn department_ranking(&self) -> Vec<DepartmentPerformance> {
        self.facet(|r| &r.department_ranking)
    }

    pub fn modality_balance(&self) -> Vec<ModalityBalance> {
        self.facet(|r| &r.modality_balance)
    }

    pub fn grade_coverage(&self) -> Vec<GradeCoverage> {
        self.facet(|r| &r.grade_coverage)
    }

    fn facet<T: Clone>(&self, select: impl Fn(&AggregateReport) -> &Vec<T>) -> Vec<T> {
        self.state
            .borrow()
            .report
            .as_ref()
            .map(|r| select(r).clone())
            .unwrap_or_default()
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

    pub fn subscribe(&self) -> watch::Receiver<ReportState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::ScriptedReportGateway;

    fn sample_report() -> AggregateReport {
        AggregateReport {
            department_ranking: vec![DepartmentPerformance {
                department_id: 1,
                department_name: "Computação".to_string(),
                mean_grade: Some(7.5),
                lowest_grade: Some(3.0),
                highest_grade: Some(10.0),
                students_assessed: Some(4),
                grades_recorded: Some(9),
            }],
            modality_balance: vec![],
            grade_coverage: vec![GradeCoverage {
                student_id: 2,
                ra: "2024002".to_string(),
                name: "Beto".to_string(),
                department_name: None,
                exams_assessed: Some(0),
                mean_grade: None,
                without_grades: Some(true),
            }],
        }
    }

    #[tokio::test]
    async fn test_facets_empty_before_fetch() {
        let store = ReportStore::new(ScriptedReportGateway::new());
        assert!(store.report().is_none());
        assert!(store.department_ranking().is_empty());
        assert!(store.modality_balance().is_empty());
        assert!(store.grade_coverage().is_empty());
        assert!(!store.is_initialized());
        assert_eq!(store.age_display(), "never");
    }

    #[tokio::test]
    async fn test_fetch_then_cache_hit() {
        let gateway = ScriptedReportGateway::new();
        gateway.push(Ok(sample_report()));
        let store = ReportStore::new(gateway.clone());

        assert_eq!(store.fetch(false).await.unwrap(), FetchOutcome::Fetched);
        assert_eq!(store.fetch(false).await.unwrap(), FetchOutcome::CacheHit);
        assert_eq!(gateway.calls(), 1);
        assert_eq!(store.department_ranking().len(), 1);
        assert_eq!(store.grade_coverage().len(), 1);
        assert!(store.modality_balance().is_empty());
        assert!(store.is_initialized());
        assert!(store.fetched_at().is_some());
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let gateway = ScriptedReportGateway::new();
        gateway.push(Ok(sample_report()));
        gateway.push(Ok(AggregateReport::default()));
        let store = ReportStore::new(gateway.clone());

        store.fetch(false).await.unwrap();
        assert!(store.refresh().await.unwrap().fetched());
        assert_eq!(gateway.calls(), 2);
        assert!(store.department_ranking().is_empty());
        assert_eq!(store.report(), Some(AggregateReport::default()));
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let gateway = ScriptedReportGateway::new();
        gateway.push(Ok(sample_report()));
        gateway.push(Err(GatewayError::from_status(
            503,
            r#"{"error":"Service Unavailable"}"#,
        )));
        let store = ReportStore::new(gateway.clone());

        store.fetch(false).await.unwrap();
        assert!(store.refresh().await.is_err());
        assert_eq!(store.department_ranking().len(), 1);
        assert_eq!(store.last_error().as_deref(), Some("Service Unavailable"));
        assert!(!store.is_loading());

        store.clear_error();
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test]
    async fn test_failed_first_fetch_stays_uninitialized() {
        let gateway = ScriptedReportGateway::new();
        gateway.push(Err(GatewayError::network("connection refused")));
        gateway.push(Ok(sample_report()));
        let store = ReportStore::new(gateway.clone());

        assert!(store.fetch(false).await.is_err());
        assert!(!store.is_initialized());
        assert_eq!(store.fetch(false).await.unwrap(), FetchOutcome::Fetched);
        assert_eq!(store.last_error(), None);
    }
}
