use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;
use crate::utils::cmp_ignore_case;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Department {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    /// Short code, e.g. "DCC".
    #[serde(default)]
    pub sigla: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Department {
    pub fn display_code(&self) -> &str {
        self.sigla.as_deref().filter(|s| !s.is_empty()).unwrap_or("-")
    }

    /// "Name (CODE)" when a code is set, otherwise just the name.
    pub fn label(&self) -> String {
        match self.sigla.as_deref() {
            Some(code) if !code.is_empty() => format!("{} ({})", self.name, code),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct DepartmentPayload {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sigla: Option<String>,
}

impl Entity for Department {
    type Id = i64;
    type Payload = DepartmentPayload;
    type UpdatePayload = DepartmentPayload;
    type Scope = ();

    const KIND: &'static str = "departments";

    fn id(&self) -> i64 {
        self.id
    }

    fn compare(&self, other: &Self) -> Ordering {
        cmp_ignore_case(&self.name, &other.name)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.id.cmp(&other.id))
    }
}
