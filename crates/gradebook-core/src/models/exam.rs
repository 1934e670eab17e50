use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;
use crate::utils::cmp_ignore_case;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Exam {
    pub id: i64,
    #[serde(rename = "departamentoId")]
    pub department_id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    /// Calendar date, `YYYY-MM-DD` on the wire.
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Exam {
    pub fn date_display(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct ExamPayload {
    #[serde(rename = "departamentoId")]
    pub department_id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "descricao", skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

impl Entity for Exam {
    type Id = i64;
    type Payload = ExamPayload;
    type UpdatePayload = ExamPayload;
    type Scope = ();

    const KIND: &'static str = "exams";

    fn id(&self) -> i64 {
        self.id
    }

    /// Newest first; same-day exams by title.
    fn compare(&self, other: &Self) -> Ordering {
        other
            .date
            .cmp(&self.date)
            .then_with(|| cmp_ignore_case(&self.title, &other.title))
            .then_with(|| self.title.cmp(&other.title))
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(id: i64, date: &str, title: &str) -> Exam {
        Exam {
            id,
            department_id: 1,
            title: title.to_string(),
            date: date.parse().unwrap(),
            description: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_same_date_orders_by_title() {
        let mut exams = vec![exam(1, "2024-03-01", "Midterm"), exam(2, "2024-03-01", "Final")];
        exams.sort_by(|a, b| a.compare(b));
        assert_eq!(exams[0].title, "Final");
        assert_eq!(exams[1].title, "Midterm");
    }

    #[test]
    fn test_newest_date_first() {
        let mut exams = vec![
            exam(1, "2023-11-20", "A"),
            exam(2, "2024-06-10", "Z"),
            exam(3, "2024-03-01", "M"),
        ];
        exams.sort_by(|a, b| a.compare(b));
        let ids: Vec<i64> = exams.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_parse_exam() {
        let json = r#"{"id":4,"departamentoId":2,"titulo":"P1","data":"2024-04-15","descricao":null,"createdAt":"2024-04-01T00:00:00Z"}"#;
        let e: Exam = serde_json::from_str(json).unwrap();
        assert_eq!(e.date_display(), "15/04/2024");
        assert!(e.description.is_none());
    }
}
