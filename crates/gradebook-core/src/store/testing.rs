//! In-memory gateways with scripted responses, for store tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::Entity;
use crate::api::{EntityGateway, GatewayError, ReportGateway};
use crate::models::{AggregateReport, Exam, Grade, Student};

type Script<T> = Mutex<VecDeque<Result<T, GatewayError>>>;

fn next<T>(script: &Script<T>, op: &str) -> Result<T, GatewayError> {
    script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(GatewayError::local(format!("no scripted {} response", op))))
}

pub struct ScriptedGateway<E: Entity> {
    lists: Script<Vec<E>>,
    creates: Script<E>,
    updates: Script<E>,
    deletes: Script<()>,
    list_calls: AtomicUsize,
    scopes: Mutex<Vec<E::Scope>>,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl<E: Entity> ScriptedGateway<E> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            lists: Mutex::new(VecDeque::new()),
            creates: Mutex::new(VecDeque::new()),
            updates: Mutex::new(VecDeque::new()),
            deletes: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            scopes: Mutex::new(Vec::new()),
            hold: Mutex::new(None),
        })
    }

    pub fn push_list(&self, response: Result<Vec<E>, GatewayError>) {
        self.lists.lock().unwrap().push_back(response);
    }

    pub fn push_create(&self, response: Result<E, GatewayError>) {
        self.creates.lock().unwrap().push_back(response);
    }

    pub fn push_update(&self, response: Result<E, GatewayError>) {
        self.updates.lock().unwrap().push_back(response);
    }

    pub fn push_delete(&self, response: Result<(), GatewayError>) {
        self.deletes.lock().unwrap().push_back(response);
    }

    /// Make every list call wait until `release` is notified.
    pub fn hold_lists(&self, release: Arc<Notify>) {
        *self.hold.lock().unwrap() = Some(release);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn requested_scopes(&self) -> Vec<E::Scope> {
        self.scopes.lock().unwrap().clone()
    }
}

#[async_trait]
impl<E: Entity> EntityGateway<E> for ScriptedGateway<E> {
    async fn list(&self, scope: &E::Scope) -> Result<Vec<E>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.scopes.lock().unwrap().push(scope.clone());
        let hold = self.hold.lock().unwrap().clone();
        if let Some(release) = hold {
            release.notified().await;
        }
        next(&self.lists, "list")
    }

    async fn create(&self, _payload: &E::Payload) -> Result<E, GatewayError> {
        next(&self.creates, "create")
    }

    async fn update(&self, _id: &E::Id, _payload: &E::UpdatePayload) -> Result<E, GatewayError> {
        next(&self.updates, "update")
    }

    async fn delete(&self, _id: &E::Id) -> Result<(), GatewayError> {
        next(&self.deletes, "delete")
    }
}

pub struct ScriptedReportGateway {
    reports: Script<AggregateReport>,
    calls: AtomicUsize,
}

impl ScriptedReportGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            reports: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn push(&self, response: Result<AggregateReport, GatewayError>) {
        self.reports.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportGateway for ScriptedReportGateway {
    async fn fetch_report(&self) -> Result<AggregateReport, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next(&self.reports, "report")
    }
}

pub fn student(id: i64, name: &str) -> Student {
    Student {
        id,
        ra: format!("2024{:03}", id),
        name: name.to_string(),
        email: None,
        department_id: 1,
        birth_date: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn exam(id: i64, date: &str, title: &str) -> Exam {
    Exam {
        id,
        department_id: 1,
        title: title.to_string(),
        date: date.parse().expect("valid test date"),
        description: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn grade(student_id: i64, exam_id: i64, value: f64) -> Grade {
    Grade {
        student_id,
        exam_id,
        value,
        note: None,
        created_at: None,
        updated_at: None,
    }
}
