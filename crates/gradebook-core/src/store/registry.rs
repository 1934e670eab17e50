use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use super::entity_store::EntityStore;
use super::grades::GradeStore;
use super::report::ReportStore;
use super::state::FetchOutcome;
use crate::api::{describe_error, ApiClient, EntityGateway, GatewayError, ReportGateway};
use crate::models::{Department, Exam, Grade, Student};

/// Gateway handles the registry builds its stores from.
#[derive(Clone)]
pub struct Gateways {
    pub students: Arc<dyn EntityGateway<Student>>,
    pub departments: Arc<dyn EntityGateway<Department>>,
    pub exams: Arc<dyn EntityGateway<Exam>>,
    pub grades: Arc<dyn EntityGateway<Grade>>,
    pub report: Arc<dyn ReportGateway>,
}

impl Gateways {
    /// Route every kind through one HTTP client.
    pub fn from_client(client: ApiClient) -> Self {
        let client = Arc::new(client);
        Self {
            students: client.clone(),
            departments: client.clone(),
            exams: client.clone(),
            grades: client.clone(),
            report: client,
        }
    }
}

/// One store per entity kind, created on first access and shared from then on.
pub struct StoreRegistry {
    gateways: Gateways,
    students: OnceLock<Arc<EntityStore<Student>>>,
    departments: OnceLock<Arc<EntityStore<Department>>>,
    exams: OnceLock<Arc<EntityStore<Exam>>>,
    grades: OnceLock<Arc<GradeStore>>,
    report: OnceLock<Arc<ReportStore>>,
}

impl StoreRegistry {
    pub fn new(client: ApiClient) -> Self {
        Self::with_gateways(Gateways::from_client(client))
    }

    pub fn with_gateways(gateways: Gateways) -> Self {
        Self {
            gateways,
            students: OnceLock::new(),
            departments: OnceLock::new(),
            exams: OnceLock::new(),
            grades: OnceLock::new(),
            report: OnceLock::new(),
        }
    }

    pub fn students(&self) -> Arc<EntityStore<Student>> {
        self.students
            .get_or_init(|| Arc::new(EntityStore::new(self.gateways.students.clone())))
            .clone()
    }

    pub fn departments(&self) -> Arc<EntityStore<Department>> {
        self.departments
            .get_or_init(|| Arc::new(EntityStore::new(self.gateways.departments.clone())))
            .clone()
    }

    pub fn exams(&self) -> Arc<EntityStore<Exam>> {
        self.exams
            .get_or_init(|| Arc::new(EntityStore::new(self.gateways.exams.clone())))
            .clone()
    }

    pub fn grades(&self) -> Arc<GradeStore> {
        self.grades
            .get_or_init(|| Arc::new(GradeStore::new(self.gateways.grades.clone())))
            .clone()
    }

    pub fn report(&self) -> Arc<ReportStore> {
        self.report
            .get_or_init(|| Arc::new(ReportStore::new(self.gateways.report.clone())))
            .clone()
    }

    /// Fetch the unscoped collections and the report concurrently.
    ///
    /// Returns one "kind: message" line per failed fetch; an empty result
    /// means everything loaded (or was already cached).
    pub async fn preload(&self, force: bool) -> Vec<String> {
        let students = self.students();
        let departments = self.departments();
        let exams = self.exams();
        let report = self.report();

        let (s, d, e, r) = futures::join!(
            students.fetch(force),
            departments.fetch(force),
            exams.fetch(force),
            report.fetch(force),
        );

        let results: [(&str, Result<FetchOutcome, GatewayError>); 4] = [
            ("students", s),
            ("departments", d),
            ("exams", e),
            ("report", r),
        ];

        let mut failures = Vec::new();
        for (kind, result) in results {
            match result {
                Ok(outcome) => debug!(kind, ?outcome, "Preloaded"),
                Err(err) => failures.push(format!("{}: {}", kind, describe_error(&err))),
            }
        }
        info!(failed = failures.len(), "Preload finished");
        failures
    }
}
