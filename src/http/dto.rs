//! Data Transfer Objects for the HTTP API.
//!
//! The entity representations live in the schemas module and are re-exported
//! here; this file holds the request/response types that only the HTTP layer
//! knows about.

use serde::{Deserialize, Serialize};

pub use crate::schemas::{DepartmentOut, DepartmentShort, EmployeeOut, EmployeeShort};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
    /// Database connectivity status
    pub database: String,
}

/// Query parameters for the employee search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchQuery {
    /// Exact date, or the lower bound when `date_for_interval` is present
    #[serde(default)]
    pub date_of_birth: Option<String>,
    /// Inclusive upper bound of the birth-date interval
    #[serde(default)]
    pub date_for_interval: Option<String>,
}
