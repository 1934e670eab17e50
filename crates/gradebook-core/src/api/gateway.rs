//! Gateway seams between the stores and the remote service.
//!
//! Stores only ever talk to these traits. `ApiClient` is the production
//! implementation; tests plug in scripted in-memory gateways.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{ApiClient, GatewayError};
use crate::models::{AggregateReport, Department, Exam, Grade, GradeKey, Student};
use crate::store::{Entity, Scope};

/// List/create/update/delete for one entity kind.
#[async_trait]
pub trait EntityGateway<E: Entity>: Send + Sync {
    async fn list(&self, scope: &E::Scope) -> Result<Vec<E>, GatewayError>;

    async fn create(&self, payload: &E::Payload) -> Result<E, GatewayError>;

    async fn update(&self, id: &E::Id, payload: &E::UpdatePayload) -> Result<E, GatewayError>;

    async fn delete(&self, id: &E::Id) -> Result<(), GatewayError>;
}

/// Source of the composite analytical report.
#[async_trait]
pub trait ReportGateway: Send + Sync {
    async fn fetch_report(&self) -> Result<AggregateReport, GatewayError>;
}

/// An entity served as a REST collection.
pub trait Resource: Entity + DeserializeOwned {
    /// Collection path relative to the API base URL.
    const PATH: &'static str;

    /// Path segment(s) addressing a single record.
    fn id_path(id: &Self::Id) -> String;
}

impl Resource for Student {
    const PATH: &'static str = "/alunos";

    fn id_path(id: &i64) -> String {
        id.to_string()
    }
}

impl Resource for Department {
    const PATH: &'static str = "/departamentos";

    fn id_path(id: &i64) -> String {
        id.to_string()
    }
}

impl Resource for Exam {
    const PATH: &'static str = "/provas";

    fn id_path(id: &i64) -> String {
        id.to_string()
    }
}

impl Resource for Grade {
    const PATH: &'static str = "/notas";

    fn id_path(id: &GradeKey) -> String {
        format!("{}/{}", id.student_id, id.exam_id)
    }
}

const REPORT_PATH: &str = "/consultas-avancadas";

#[async_trait]
impl<E: Resource> EntityGateway<E> for ApiClient {
    async fn list(&self, scope: &E::Scope) -> Result<Vec<E>, GatewayError> {
        self.get(E::PATH, &scope.query_pairs()).await
    }

    async fn create(&self, payload: &E::Payload) -> Result<E, GatewayError> {
        self.post(E::PATH, payload).await
    }

    async fn update(&self, id: &E::Id, payload: &E::UpdatePayload) -> Result<E, GatewayError> {
        let path = format!("{}/{}", E::PATH, E::id_path(id));
        self.put(&path, payload).await
    }

    async fn delete(&self, id: &E::Id) -> Result<(), GatewayError> {
        let path = format!("{}/{}", E::PATH, E::id_path(id));
        self.delete_resource(&path).await
    }
}

#[async_trait]
impl ReportGateway for ApiClient {
    async fn fetch_report(&self) -> Result<AggregateReport, GatewayError> {
        self.get(REPORT_PATH, &[]).await
    }
}
