//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and composes the schemas
//! module (validation, response shaping) with the persistence service layer.
//! The literal error messages are part of the wire contract; note that the
//! employee endpoints use two distinct 404 wordings (GET/DELETE vs PUT).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::dto::{DepartmentOut, EmployeeOut, HealthResponse, SearchQuery};
use super::error::AppError;
use super::state::AppState;
use crate::api::{Department, DepartmentId, DepartmentPatch, Employee, EmployeeId};
use crate::db::repository::{FullRepository, RepositoryError};
use crate::db::services as db_services;
use crate::schemas;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for creation handlers (201 + body).
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

async fn find_department_or_404(
    repo: &dyn FullRepository,
    dep_id: i32,
) -> Result<Department, AppError> {
    db_services::get_department(repo, DepartmentId::new(dep_id))
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Department with id = {} was not found", dep_id))
        })
}

async fn find_employee_or_404(
    repo: &dyn FullRepository,
    emp_id: i32,
    message: String,
) -> Result<Employee, AppError> {
    db_services::get_employee(repo, EmployeeId::new(emp_id))
        .await?
        .ok_or(AppError::NotFound(message))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is
/// accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database,
    }))
}

// =============================================================================
// Departments collection/item
// =============================================================================

/// GET /api/v1/departments
///
/// List all departments with their employees and derived average salary.
pub async fn list_departments(State(state): State<AppState>) -> HandlerResult<Vec<DepartmentOut>> {
    let repo = state.repository.as_ref();
    let departments = db_services::list_departments(repo).await?;
    let out = schemas::dump_departments(repo, &departments).await?;
    Ok(Json(out))
}

/// GET /api/v1/departments/{id}
pub async fn get_department(
    State(state): State<AppState>,
    Path(dep_id): Path<i32>,
) -> HandlerResult<DepartmentOut> {
    let repo = state.repository.as_ref();
    let department = find_department_or_404(repo, dep_id).await?;
    Ok(Json(schemas::dump_department(repo, &department).await?))
}

/// POST /api/v1/departments
///
/// Create a department. 400 with schema errors on an invalid body, 400 with
/// a uniqueness message on a duplicate title, 201 otherwise.
pub async fn create_department(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> CreatedResult<DepartmentOut> {
    let repo = state.repository.as_ref();
    let fields = schemas::load_department(&body)?;

    let department = match db_services::create_department(repo, fields).await {
        Ok(department) => department,
        Err(RepositoryError::UniqueViolation { .. }) => {
            return Err(AppError::BadRequest(
                "Department names should be unique".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        StatusCode::CREATED,
        Json(schemas::dump_department(repo, &department).await?),
    ))
}

/// PUT /api/v1/departments/{id}
///
/// Rename a department. The body is validated with the full department
/// schema (title required).
pub async fn update_department(
    State(state): State<AppState>,
    Path(dep_id): Path<i32>,
    Json(body): Json<Value>,
) -> HandlerResult<DepartmentOut> {
    let repo = state.repository.as_ref();
    let department = find_department_or_404(repo, dep_id).await?;
    let fields = schemas::load_department(&body)?;

    let patch = DepartmentPatch {
        title: Some(fields.title),
    };
    let updated = match db_services::update_department(repo, &department, patch).await {
        Ok(updated) => updated,
        Err(RepositoryError::UniqueViolation { .. }) => {
            return Err(AppError::BadRequest(
                "Department names should be unique".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(schemas::dump_department(repo, &updated).await?))
}

/// DELETE /api/v1/departments/{id}
///
/// Delete a department and, by cascade, all its employees. 204 on success.
pub async fn delete_department(
    State(state): State<AppState>,
    Path(dep_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let repo = state.repository.as_ref();
    let department = find_department_or_404(repo, dep_id).await?;
    db_services::delete_department(repo, &department).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Department-scoped employees
// =============================================================================

/// GET /api/v1/departments/{id}/employees
pub async fn list_department_employees(
    State(state): State<AppState>,
    Path(dep_id): Path<i32>,
) -> HandlerResult<Vec<EmployeeOut>> {
    let repo = state.repository.as_ref();
    let department = find_department_or_404(repo, dep_id).await?;
    let employees = db_services::employees_in_department(repo, department.id).await?;
    Ok(Json(schemas::dump_employees(repo, &employees).await?))
}

/// POST /api/v1/departments/{id}/employees
///
/// Create an employee inside the department from the URL. A `department_id`
/// in the body is ignored; the URL id wins.
pub async fn create_department_employee(
    State(state): State<AppState>,
    Path(dep_id): Path<i32>,
    Json(body): Json<Value>,
) -> CreatedResult<EmployeeOut> {
    let repo = state.repository.as_ref();
    let department = find_department_or_404(repo, dep_id).await?;
    let fields = schemas::load_new_employee(&body, Some(department.id))?;

    let employee = db_services::create_employee(repo, fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(schemas::dump_employee(repo, &employee).await?),
    ))
}

// =============================================================================
// Employees collection/item
// =============================================================================

/// GET /api/v1/employees
pub async fn list_employees(State(state): State<AppState>) -> HandlerResult<Vec<EmployeeOut>> {
    let repo = state.repository.as_ref();
    let employees = db_services::list_employees(repo).await?;
    Ok(Json(schemas::dump_employees(repo, &employees).await?))
}

/// GET /api/v1/employees/{id}
pub async fn get_employee(
    State(state): State<AppState>,
    Path(emp_id): Path<i32>,
) -> HandlerResult<EmployeeOut> {
    let repo = state.repository.as_ref();
    let employee = find_employee_or_404(
        repo,
        emp_id,
        format!("Employee with id = {} was not found", emp_id),
    )
    .await?;
    Ok(Json(schemas::dump_employee(repo, &employee).await?))
}

/// POST /api/v1/employees
///
/// Create an employee. A `department_id` referencing no department is a 400
/// (not a 404): the id arrives in the body, not the URL.
pub async fn create_employee(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> CreatedResult<EmployeeOut> {
    let repo = state.repository.as_ref();
    let fields = schemas::load_new_employee(&body, None)?;

    let employee = match db_services::create_employee(repo, fields).await {
        Ok(employee) => employee,
        Err(RepositoryError::ForeignKeyViolation { .. }) => {
            return Err(AppError::BadRequest("Not valid department id".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        StatusCode::CREATED,
        Json(schemas::dump_employee(repo, &employee).await?),
    ))
}

/// PUT /api/v1/employees/{id}
///
/// Partial update: any subset of `full_name`, `date_of_birth`, `salary`,
/// `department_id`.
pub async fn update_employee(
    State(state): State<AppState>,
    Path(emp_id): Path<i32>,
    Json(body): Json<Value>,
) -> HandlerResult<EmployeeOut> {
    let repo = state.repository.as_ref();
    let employee = find_employee_or_404(
        repo,
        emp_id,
        format!("Employee with id {} not found", emp_id),
    )
    .await?;
    let patch = schemas::load_employee_patch(&body)?;

    let updated = match db_services::update_employee(repo, &employee, patch).await {
        Ok(updated) => updated,
        Err(RepositoryError::ForeignKeyViolation { .. }) => {
            return Err(AppError::BadRequest("Not valid department id".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(schemas::dump_employee(repo, &updated).await?))
}

/// DELETE /api/v1/employees/{id}
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(emp_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let repo = state.repository.as_ref();
    let employee = find_employee_or_404(
        repo,
        emp_id,
        format!("Employee with id = {} was not found", emp_id),
    )
    .await?;
    db_services::delete_employee(repo, &employee).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Employee search
// =============================================================================

fn parse_search_query(
    query: &SearchQuery,
) -> Result<(chrono::NaiveDate, Option<chrono::NaiveDate>), AppError> {
    // Empty parameters count as absent, like the form submissions they come from.
    let date_of_birth = query
        .date_of_birth
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Enter search data".to_string()))?;
    let date = schemas::parse_iso_date("date_of_birth", date_of_birth)?;

    let date_for_interval = query
        .date_for_interval
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|raw| schemas::parse_iso_date("date_for_interval", raw))
        .transpose()?;

    Ok((date, date_for_interval))
}

/// GET /api/v1/employees/search?date_of_birth=&date_for_interval=
///
/// Exact birth-date match, or an inclusive range when `date_for_interval`
/// is present.
pub async fn search_employees(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> HandlerResult<Vec<EmployeeOut>> {
    let repo = state.repository.as_ref();
    let (date, date_for_interval) = parse_search_query(&query)?;

    let employees = db_services::employees_by_date_of_birth(repo, date, date_for_interval).await?;
    Ok(Json(schemas::dump_employees(repo, &employees).await?))
}

/// GET /api/v1/departments/{id}/employees/search
///
/// Same as the unscoped search, restricted to one department.
pub async fn search_department_employees(
    State(state): State<AppState>,
    Path(dep_id): Path<i32>,
    Query(query): Query<SearchQuery>,
) -> HandlerResult<Vec<EmployeeOut>> {
    let repo = state.repository.as_ref();
    let (date, date_for_interval) = parse_search_query(&query)?;

    let department = db_services::get_department(repo, DepartmentId::new(dep_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Department with id {} not found", dep_id)))?;

    let employees = db_services::employees_by_date_of_birth_in_department(
        repo,
        department.id,
        date,
        date_for_interval,
    )
    .await?;
    Ok(Json(schemas::dump_employees(repo, &employees).await?))
}
