//! Remote gateway module for the gradebook REST API.
//!
//! This module provides:
//! - `EntityGateway` / `ReportGateway`: the async seams the stores call
//! - `ApiClient`: the reqwest-backed implementation of both
//! - `GatewayError` and `describe_error`: the failure taxonomy and the
//!   single-message rendering every store records as its last error
//!
//! Session handling is external: the client keeps a cookie store and
//! carries whatever session the server has established.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::ApiClient;
pub use error::{describe_error, GatewayError};
pub use gateway::{EntityGateway, ReportGateway, Resource};
