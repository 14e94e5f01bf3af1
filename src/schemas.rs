//! Validation and serialization schemas for departments and employees.
//!
//! Inbound: loaders take raw JSON bodies and either produce validated field
//! structs or a field-keyed error map (`{"field": ["message", ...]}`), the
//! shape the REST layer returns with status 400. Unknown keys are ignored.
//!
//! Outbound: dump functions shape entities into their wire representations,
//! nesting the "short" form of the related entity so the department/employee
//! recursion is cut off on both sides. The derived `avg_salary` field is
//! computed through the service layer, never stored.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{
    Department, DepartmentId, Employee, EmployeeId, EmployeePatch, NewDepartment, NewEmployee,
};
use crate::db::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::db::services;

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 128;
const FULL_NAME_MIN: usize = 6;
const FULL_NAME_MAX: usize = 128;

/// Field-keyed validation errors, serialized as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for one field, empty slice if the field is clean.
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join("; ")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

// =============================================================================
// Inbound loaders
// =============================================================================

/// Validate a department payload. `title` is required, 3-128 characters.
pub fn load_department(value: &Value) -> Result<NewDepartment, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = match value.get("title") {
        None | Some(Value::Null) => {
            errors.push("title", "title is required");
            None
        }
        Some(raw) => validate_title(raw, &mut errors),
    };

    match title {
        Some(title) if errors.is_empty() => Ok(NewDepartment { title }),
        _ => Err(errors),
    }
}

/// Validate an employee creation payload.
///
/// When `forced_department_id` is set (department-scoped creation), the URL id
/// wins and any `department_id` in the body is ignored; otherwise the body
/// field is required.
pub fn load_new_employee(
    value: &Value,
    forced_department_id: Option<DepartmentId>,
) -> Result<NewEmployee, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let full_name = match value.get("full_name") {
        None | Some(Value::Null) => {
            errors.push("full_name", "full name is required");
            None
        }
        Some(raw) => validate_full_name(raw, &mut errors),
    };

    let salary = match value.get("salary") {
        None | Some(Value::Null) => {
            errors.push("salary", "salary is required");
            None
        }
        Some(raw) => validate_salary(raw, &mut errors),
    };

    let date_of_birth = match value.get("date_of_birth") {
        None | Some(Value::Null) => {
            errors.push("date_of_birth", "Missing data for required field.");
            None
        }
        Some(raw) => validate_date(raw, "date_of_birth", &mut errors),
    };

    let department_id = match forced_department_id {
        Some(id) => Some(id),
        None => match value.get("department_id") {
            None | Some(Value::Null) => {
                errors.push("department_id", "department_id is required");
                None
            }
            Some(raw) => validate_department_id(raw, &mut errors),
        },
    };

    match (full_name, date_of_birth, salary, department_id) {
        (Some(full_name), Some(date_of_birth), Some(salary), Some(department_id))
            if errors.is_empty() =>
        {
            Ok(NewEmployee {
                full_name,
                date_of_birth,
                salary,
                department_id,
            })
        }
        _ => Err(errors),
    }
}

/// Validate a partial employee update. Every field is optional; present
/// fields are validated with the same rules as creation, absent fields are
/// left unset in the patch.
pub fn load_employee_patch(value: &Value) -> Result<EmployeePatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut patch = EmployeePatch::default();

    if let Some(raw) = value.get("full_name") {
        patch.full_name = validate_full_name(raw, &mut errors);
    }
    if let Some(raw) = value.get("salary") {
        patch.salary = validate_salary(raw, &mut errors);
    }
    if let Some(raw) = value.get("date_of_birth") {
        patch.date_of_birth = validate_date(raw, "date_of_birth", &mut errors);
    }
    if let Some(raw) = value.get("department_id") {
        patch.department_id = validate_department_id(raw, &mut errors);
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

/// Parse an ISO `YYYY-MM-DD` query-string date, reporting failures under
/// `field`.
pub fn parse_iso_date(field: &str, raw: &str) -> Result<NaiveDate, ValidationErrors> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        let mut errors = ValidationErrors::new();
        errors.push(field, "Not a valid date.");
        errors
    })
}

fn validate_title(raw: &Value, errors: &mut ValidationErrors) -> Option<String> {
    let Some(title) = raw.as_str() else {
        errors.push("title", "Not a valid string.");
        return None;
    };
    let length = title.chars().count();
    if !(TITLE_MIN..=TITLE_MAX).contains(&length) {
        errors.push(
            "title",
            format!("Length must be between {} and {}.", TITLE_MIN, TITLE_MAX),
        );
        return None;
    }
    Some(title.to_string())
}

fn validate_full_name(raw: &Value, errors: &mut ValidationErrors) -> Option<String> {
    let Some(full_name) = raw.as_str() else {
        errors.push("full_name", "Not a valid string.");
        return None;
    };

    // Exactly two alphabetic tokens: "First Last", no digits or punctuation.
    let mut valid = true;
    let alphabetic = full_name
        .chars()
        .filter(|c| *c != ' ')
        .all(char::is_alphabetic);
    if !alphabetic || full_name.split_whitespace().count() != 2 {
        errors.push("full_name", "Wrong full name");
        valid = false;
    }

    let length = full_name.chars().count();
    if !(FULL_NAME_MIN..=FULL_NAME_MAX).contains(&length) {
        errors.push(
            "full_name",
            format!("Length must be between {} and {}.", FULL_NAME_MIN, FULL_NAME_MAX),
        );
        valid = false;
    }

    valid.then(|| full_name.to_string())
}

fn validate_salary(raw: &Value, errors: &mut ValidationErrors) -> Option<i32> {
    let Some(salary) = raw.as_i64().and_then(|v| i32::try_from(v).ok()) else {
        errors.push("salary", "Not a valid integer.");
        return None;
    };
    if salary < 0 {
        errors.push("salary", "Must be greater than or equal to 0.");
        return None;
    }
    Some(salary)
}

fn validate_date(raw: &Value, field: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let parsed = raw
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
    if parsed.is_none() {
        errors.push(field, "Not a valid date.");
    }
    parsed
}

fn validate_department_id(raw: &Value, errors: &mut ValidationErrors) -> Option<DepartmentId> {
    let Some(id) = raw.as_i64().and_then(|v| i32::try_from(v).ok()) else {
        errors.push("department_id", "Not a valid integer.");
        return None;
    };
    Some(DepartmentId::new(id))
}

// =============================================================================
// Outbound representations
// =============================================================================

/// Employee nested inside a department, without the department back-reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeShort {
    pub id: EmployeeId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub salary: i32,
}

/// Department nested inside an employee, without its employee list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentShort {
    pub id: DepartmentId,
    pub title: String,
    pub avg_salary: i32,
}

/// Full department representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentOut {
    pub id: DepartmentId,
    pub title: String,
    pub avg_salary: i32,
    pub employees: Vec<EmployeeShort>,
}

/// Full employee representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeOut {
    pub id: EmployeeId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub salary: i32,
    pub department: DepartmentShort,
}

impl From<&Employee> for EmployeeShort {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name.clone(),
            date_of_birth: employee.date_of_birth,
            salary: employee.salary,
        }
    }
}

/// Shape a department for the wire, with derived `avg_salary` and nested
/// employee list.
pub async fn dump_department(
    repo: &dyn FullRepository,
    department: &Department,
) -> RepositoryResult<DepartmentOut> {
    let employees = services::employees_in_department(repo, department.id).await?;
    let avg_salary = services::get_avg_salary(repo, department).await?;

    Ok(DepartmentOut {
        id: department.id,
        title: department.title.clone(),
        avg_salary,
        employees: employees.iter().map(EmployeeShort::from).collect(),
    })
}

/// Shape a list of departments for the wire.
pub async fn dump_departments(
    repo: &dyn FullRepository,
    departments: &[Department],
) -> RepositoryResult<Vec<DepartmentOut>> {
    let mut out = Vec::with_capacity(departments.len());
    for department in departments {
        out.push(dump_department(repo, department).await?);
    }
    Ok(out)
}

/// Shape an employee for the wire, with its department nested in short form.
pub async fn dump_employee(
    repo: &dyn FullRepository,
    employee: &Employee,
) -> RepositoryResult<EmployeeOut> {
    let department = services::get_department(repo, employee.department_id)
        .await?
        .ok_or_else(|| {
            // FK integrity should make this unreachable.
            RepositoryError::internal_with_context(
                format!(
                    "Employee {} references missing department {}",
                    employee.id, employee.department_id
                ),
                ErrorContext::new("dump_employee")
                    .with_entity("employee")
                    .with_entity_id(employee.id),
            )
        })?;
    let avg_salary = services::get_avg_salary(repo, &department).await?;

    Ok(EmployeeOut {
        id: employee.id,
        full_name: employee.full_name.clone(),
        date_of_birth: employee.date_of_birth,
        salary: employee.salary,
        department: DepartmentShort {
            id: department.id,
            title: department.title,
            avg_salary,
        },
    })
}

/// Shape a list of employees for the wire.
pub async fn dump_employees(
    repo: &dyn FullRepository,
    employees: &[Employee],
) -> RepositoryResult<Vec<EmployeeOut>> {
    let mut out = Vec::with_capacity(employees.len());
    for employee in employees {
        out.push(dump_employee(repo, employee).await?);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "schemas_tests.rs"]
mod schemas_tests;
