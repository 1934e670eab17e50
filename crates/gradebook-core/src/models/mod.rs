//! Data models for gradebook entities.
//!
//! This module contains the records exchanged with the remote API:
//!
//! - `Student`, `Department`, `Exam`: id-keyed records
//! - `Grade`: keyed by (student, exam) through `GradeKey`
//! - Write payloads for each of the above and the `GradeQuery` filter
//! - `AggregateReport` and its three read-only facets

pub mod department;
pub mod exam;
pub mod grade;
pub mod report;
pub mod student;

pub use department::{Department, DepartmentPayload};
pub use exam::{Exam, ExamPayload};
pub use grade::{Grade, GradeKey, GradePayload, GradeQuery, GradeUpdatePayload};
pub use report::{AggregateReport, DepartmentPerformance, GradeCoverage, ModalityBalance};
pub use student::{Student, StudentPayload};
