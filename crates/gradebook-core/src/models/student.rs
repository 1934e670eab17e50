use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;
use crate::utils::cmp_ignore_case;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Student {
    pub id: i64,
    /// Registration code, unique per student.
    pub ra: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "departamentoId")]
    pub department_id: i64,
    #[serde(rename = "dataNascimento", default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Student {
    pub fn display_email(&self) -> &str {
        self.email.as_deref().filter(|e| !e.is_empty()).unwrap_or("-")
    }

    pub fn birth_date_display(&self) -> String {
        self.birth_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Writable fields of a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct StudentPayload {
    pub ra: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(rename = "departamentoId")]
    pub department_id: i64,
    #[serde(rename = "dataNascimento", skip_serializing_if = "Option::is_none", default)]
    pub birth_date: Option<NaiveDate>,
}

impl Entity for Student {
    type Id = i64;
    type Payload = StudentPayload;
    type UpdatePayload = StudentPayload;
    type Scope = ();

    const KIND: &'static str = "students";

    fn id(&self) -> i64 {
        self.id
    }

    fn compare(&self, other: &Self) -> Ordering {
        cmp_ignore_case(&self.name, &other.name)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.id.cmp(&other.id))
    }
}
