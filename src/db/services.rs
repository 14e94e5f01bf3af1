//! High-level persistence service functions.
//!
//! These functions are the recommended entry point for application code. They
//! work against any [`FullRepository`] implementation and carry no HTTP
//! knowledge; the REST layer composes them with the schemas module.

use chrono::NaiveDate;

use crate::api::{
    Department, DepartmentId, DepartmentPatch, Employee, EmployeeId, EmployeePatch, NewDepartment,
    NewEmployee,
};
use crate::db::repository::{FullRepository, RepositoryResult};

// =============================================================================
// Departments
// =============================================================================

/// List all departments in insertion order.
pub async fn list_departments(repo: &dyn FullRepository) -> RepositoryResult<Vec<Department>> {
    repo.list_departments().await
}

/// Fetch a department by id, `None` if absent.
pub async fn get_department(
    repo: &dyn FullRepository,
    id: DepartmentId,
) -> RepositoryResult<Option<Department>> {
    repo.find_department(id).await
}

/// Create a department from validated fields and return it with its
/// generated id.
pub async fn create_department(
    repo: &dyn FullRepository,
    new: NewDepartment,
) -> RepositoryResult<Department> {
    repo.insert_department(new).await
}

/// Apply a partial update to an existing department.
pub async fn update_department(
    repo: &dyn FullRepository,
    department: &Department,
    patch: DepartmentPatch,
) -> RepositoryResult<Department> {
    repo.update_department(department.id, patch).await
}

/// Delete a department, cascading to its employees.
pub async fn delete_department(
    repo: &dyn FullRepository,
    department: &Department,
) -> RepositoryResult<()> {
    repo.delete_department(department.id).await
}

/// Arithmetic mean of the department's salaries, rounded to the nearest
/// integer. `0` for a department with no employees.
pub async fn get_avg_salary(
    repo: &dyn FullRepository,
    department: &Department,
) -> RepositoryResult<i32> {
    let employees = repo.employees_in_department(department.id).await?;
    if employees.is_empty() {
        return Ok(0);
    }

    let total: i64 = employees.iter().map(|e| i64::from(e.salary)).sum();
    Ok((total as f64 / employees.len() as f64).round() as i32)
}

// =============================================================================
// Employees
// =============================================================================

/// List all employees in insertion order.
pub async fn list_employees(repo: &dyn FullRepository) -> RepositoryResult<Vec<Employee>> {
    repo.list_employees().await
}

/// List the employees of one department, empty if none match.
pub async fn employees_in_department(
    repo: &dyn FullRepository,
    department_id: DepartmentId,
) -> RepositoryResult<Vec<Employee>> {
    repo.employees_in_department(department_id).await
}

/// Fetch an employee by id, `None` if absent.
pub async fn get_employee(
    repo: &dyn FullRepository,
    id: EmployeeId,
) -> RepositoryResult<Option<Employee>> {
    repo.find_employee(id).await
}

/// Create an employee from validated fields and return it with its
/// generated id.
pub async fn create_employee(
    repo: &dyn FullRepository,
    new: NewEmployee,
) -> RepositoryResult<Employee> {
    repo.insert_employee(new).await
}

/// Apply a partial update to an existing employee.
pub async fn update_employee(
    repo: &dyn FullRepository,
    employee: &Employee,
    patch: EmployeePatch,
) -> RepositoryResult<Employee> {
    repo.update_employee(employee.id, patch).await
}

/// Delete an employee.
pub async fn delete_employee(
    repo: &dyn FullRepository,
    employee: &Employee,
) -> RepositoryResult<()> {
    repo.delete_employee(employee.id).await
}

/// Employees born on `date`, or inside the inclusive interval
/// `[date, date_for_interval]` when the upper bound is given.
pub async fn employees_by_date_of_birth(
    repo: &dyn FullRepository,
    date: NaiveDate,
    date_for_interval: Option<NaiveDate>,
) -> RepositoryResult<Vec<Employee>> {
    repo.employees_by_date_of_birth(None, date, date_for_interval)
        .await
}

/// Same as [`employees_by_date_of_birth`], restricted to one department.
pub async fn employees_by_date_of_birth_in_department(
    repo: &dyn FullRepository,
    department_id: DepartmentId,
    date: NaiveDate,
    date_for_interval: Option<NaiveDate>,
) -> RepositoryResult<Vec<Employee>> {
    repo.employees_by_date_of_birth(Some(department_id), date, date_for_interval)
        .await
}

/// Verify the backing store is reachable.
pub async fn health_check(repo: &dyn FullRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}
