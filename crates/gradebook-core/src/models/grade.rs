use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Entity, Scope};

/// Composite identity of a grade: one per (student, exam).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct GradeKey {
    #[serde(rename = "alunoId")]
    pub student_id: i64,
    #[serde(rename = "provaId")]
    pub exam_id: i64,
}

impl GradeKey {
    pub fn new(student_id: i64, exam_id: i64) -> Self {
        Self { student_id, exam_id }
    }
}

impl fmt::Display for GradeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.student_id, self.exam_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Grade {
    #[serde(rename = "alunoId")]
    pub student_id: i64,
    #[serde(rename = "provaId")]
    pub exam_id: i64,
    #[serde(rename = "valor")]
    pub value: f64,
    #[serde(rename = "observacao", default)]
    pub note: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Grade {
    pub fn key(&self) -> GradeKey {
        GradeKey::new(self.student_id, self.exam_id)
    }

    pub fn display_value(&self) -> String {
        format!("{:.1}", self.value)
    }
}

/// Fields sent when recording a new grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct GradePayload {
    #[serde(rename = "alunoId")]
    pub student_id: i64,
    #[serde(rename = "provaId")]
    pub exam_id: i64,
    #[serde(rename = "valor")]
    pub value: f64,
    #[serde(rename = "observacao", skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

/// Fields sent when changing an existing grade; the key travels in the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct GradeUpdatePayload {
    #[serde(rename = "valor")]
    pub value: f64,
    #[serde(rename = "observacao", skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

/// Filter for the grade listing. Unset fields do not constrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct GradeQuery {
    #[serde(rename = "alunoId", skip_serializing_if = "Option::is_none", default)]
    pub student_id: Option<i64>,
    #[serde(rename = "provaId", skip_serializing_if = "Option::is_none", default)]
    pub exam_id: Option<i64>,
}

impl GradeQuery {
    pub fn for_student(student_id: i64) -> Self {
        Self {
            student_id: Some(student_id),
            exam_id: None,
        }
    }

    pub fn for_exam(exam_id: i64) -> Self {
        Self {
            student_id: None,
            exam_id: Some(exam_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.student_id.is_none() && self.exam_id.is_none()
    }
}

impl Scope<Grade> for GradeQuery {
    fn admits(&self, grade: &Grade) -> bool {
        self.student_id.map_or(true, |id| id == grade.student_id)
            && self.exam_id.map_or(true, |id| id == grade.exam_id)
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.student_id {
            pairs.push(("alunoId", id.to_string()));
        }
        if let Some(id) = self.exam_id {
            pairs.push(("provaId", id.to_string()));
        }
        pairs
    }
}

impl Entity for Grade {
    type Id = GradeKey;
    type Payload = GradePayload;
    type UpdatePayload = GradeUpdatePayload;
    type Scope = GradeQuery;

    const KIND: &'static str = "grades";

    fn id(&self) -> GradeKey {
        self.key()
    }

    /// Highest exam id first, then by student id.
    fn compare(&self, other: &Self) -> Ordering {
        other
            .exam_id
            .cmp(&self.exam_id)
            .then_with(|| self.student_id.cmp(&other.student_id))
    }
}
