//! Gradebook core - cached access to the school grading API.
//!
//! Consumers build a `StoreRegistry` over an `ApiClient` and read collections
//! through its stores. Stores fetch lazily, collapse concurrent fetches,
//! apply writes only after the server confirms them, and keep their records
//! in a stable order. Every failure is reduced to one display message by
//! `api::describe_error`.

pub mod api;
pub mod config;
pub mod models;
pub mod store;
pub mod utils;

pub use api::{describe_error, ApiClient, GatewayError};
pub use config::Config;
pub use store::{EntityStore, FetchOutcome, GradeStore, ReportStore, StoreRegistry};
