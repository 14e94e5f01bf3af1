//! Public API surface for the department service.
//!
//! This file consolidates the domain entity types shared by the repository,
//! service, and HTTP layers. All types derive Serialize/Deserialize for JSON
//! serialization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Department identifier (database primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DepartmentId(pub i32);

/// Employee identifier (database primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub i32);

impl DepartmentId {
    pub fn new(value: i32) -> Self {
        DepartmentId(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl EmployeeId {
    pub fn new(value: i32) -> Self {
        EmployeeId(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DepartmentId> for i32 {
    fn from(id: DepartmentId) -> Self {
        id.0
    }
}
impl From<EmployeeId> for i32 {
    fn from(id: EmployeeId) -> Self {
        id.0
    }
}

/// An organizational unit owning zero or more employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    /// Unique across all departments (store-enforced).
    pub title: String,
}

/// A person record belonging to exactly one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub salary: i32,
    pub department_id: DepartmentId,
}

/// Validated fields for inserting a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDepartment {
    pub title: String,
}

/// Validated fields for inserting an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub salary: i32,
    pub department_id: DepartmentId,
}

/// Partial update for a department. Unset fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentPatch {
    pub title: Option<String>,
}

/// Partial update for an employee. Unset fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePatch {
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub salary: Option<i32>,
    pub department_id: Option<DepartmentId>,
}

impl DepartmentPatch {
    /// True when no field is set; applying it is a no-op.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
    }
}

impl EmployeePatch {
    /// True when no field is set; applying it is a no-op.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.date_of_birth.is_none()
            && self.salary.is_none()
            && self.department_id.is_none()
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
