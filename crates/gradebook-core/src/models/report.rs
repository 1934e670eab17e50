//! Read-only analytical report models.
//!
//! The report endpoint returns one composite payload with three independent
//! facets. None of them has an identity of its own; the whole payload is
//! replaced on every fetch.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct AggregateReport {
    #[serde(rename = "rankingDepartamentos", default)]
    pub department_ranking: Vec<DepartmentPerformance>,
    #[serde(rename = "alunosModalidades", default)]
    pub modality_balance: Vec<ModalityBalance>,
    #[serde(rename = "coberturaNotas", default)]
    pub grade_coverage: Vec<GradeCoverage>,
}

/// One row of the department ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct DepartmentPerformance {
    #[serde(rename = "departamentoId")]
    pub department_id: i64,
    #[serde(rename = "departamentoNome")]
    pub department_name: String,
    #[serde(rename = "mediaNotas", default)]
    pub mean_grade: Option<f64>,
    #[serde(rename = "menorNota", default)]
    pub lowest_grade: Option<f64>,
    #[serde(rename = "maiorNota", default)]
    pub highest_grade: Option<f64>,
    #[serde(rename = "alunosAvaliados", default)]
    pub students_assessed: Option<i64>,
    #[serde(rename = "notasLancadas", default)]
    pub grades_recorded: Option<i64>,
}

impl DepartmentPerformance {
    pub fn mean_display(&self) -> String {
        format_score(self.mean_grade)
    }

    /// "min - max" range of recorded grades.
    pub fn range_display(&self) -> String {
        format!(
            "{} - {}",
            format_score(self.lowest_grade),
            format_score(self.highest_grade)
        )
    }
}

/// Students evaluated both by exams and by delivered projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct ModalityBalance {
    #[serde(rename = "alunoId")]
    pub student_id: i64,
    pub ra: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "departamentoNome", default)]
    pub department_name: Option<String>,
    #[serde(rename = "avaliacoesProva", default)]
    pub exam_assessments: Option<i64>,
    #[serde(rename = "projetosEntregues", default)]
    pub projects_delivered: Option<i64>,
}

/// How many exams of their department each student has a grade for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct GradeCoverage {
    #[serde(rename = "alunoId")]
    pub student_id: i64,
    pub ra: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "departamentoNome", default)]
    pub department_name: Option<String>,
    #[serde(rename = "provasAvaliadas", default)]
    pub exams_assessed: Option<i64>,
    #[serde(rename = "mediaNotas", default)]
    pub mean_grade: Option<f64>,
    #[serde(rename = "semNotas", default)]
    pub without_grades: Option<bool>,
}

impl GradeCoverage {
    pub fn has_grades(&self) -> bool {
        !self.without_grades.unwrap_or(false)
    }

    pub fn mean_display(&self) -> String {
        format_score(self.mean_grade)
    }
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("{:.2}", value),
        None => "-".to_string(),
    }
}
