//! Repository trait definitions for the department service.
//!
//! The traits abstract over the storage backend so the service and HTTP
//! layers work identically against Postgres and the in-memory backend.
//!
//! # Thread Safety
//! Implementations must be `Send + Sync` to work with async Rust.

pub mod error;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::api::{
    Department, DepartmentId, DepartmentPatch, Employee, EmployeeId, EmployeePatch, NewDepartment,
    NewEmployee,
};

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Repository trait for department operations.
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// List all departments in insertion order (ascending id).
    async fn list_departments(&self) -> RepositoryResult<Vec<Department>>;

    /// Look up a department by id. Absence is `Ok(None)`, never an error.
    async fn find_department(&self, id: DepartmentId) -> RepositoryResult<Option<Department>>;

    /// Insert a new department and return it with its generated id.
    ///
    /// Fails with [`RepositoryError::UniqueViolation`] when the title
    /// duplicates an existing department.
    async fn insert_department(&self, new: NewDepartment) -> RepositoryResult<Department>;

    /// Apply the set fields of `patch` to the department with the given id.
    ///
    /// Fails with [`RepositoryError::NotFound`] when the id is unknown and
    /// [`RepositoryError::UniqueViolation`] on a duplicate title.
    async fn update_department(
        &self,
        id: DepartmentId,
        patch: DepartmentPatch,
    ) -> RepositoryResult<Department>;

    /// Delete a department, cascading to all its employees.
    async fn delete_department(&self, id: DepartmentId) -> RepositoryResult<()>;
}

/// Repository trait for employee operations.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// List all employees in insertion order (ascending id).
    async fn list_employees(&self) -> RepositoryResult<Vec<Employee>>;

    /// List the employees of one department, empty if none match.
    async fn employees_in_department(
        &self,
        department_id: DepartmentId,
    ) -> RepositoryResult<Vec<Employee>>;

    /// Look up an employee by id. Absence is `Ok(None)`, never an error.
    async fn find_employee(&self, id: EmployeeId) -> RepositoryResult<Option<Employee>>;

    /// Insert a new employee and return it with its generated id.
    ///
    /// Fails with [`RepositoryError::ForeignKeyViolation`] when
    /// `department_id` does not reference an existing department.
    async fn insert_employee(&self, new: NewEmployee) -> RepositoryResult<Employee>;

    /// Apply the set fields of `patch` to the employee with the given id.
    ///
    /// Same foreign-key semantics as [`Self::insert_employee`].
    async fn update_employee(
        &self,
        id: EmployeeId,
        patch: EmployeePatch,
    ) -> RepositoryResult<Employee>;

    /// Delete an employee.
    async fn delete_employee(&self, id: EmployeeId) -> RepositoryResult<()>;

    /// Query employees by date of birth.
    ///
    /// Without `date_for_interval` this is an exact match on `date`; with it,
    /// the inclusive range `date <= date_of_birth <= date_for_interval`.
    /// The caller is responsible for passing an ordered pair; no validation
    /// of the ordering is performed. `department_id` restricts the query to
    /// one department.
    async fn employees_by_date_of_birth(
        &self,
        department_id: Option<DepartmentId>,
        date: NaiveDate,
        date_for_interval: Option<NaiveDate>,
    ) -> RepositoryResult<Vec<Employee>>;
}

/// Combined repository interface used by the application.
#[async_trait]
pub trait FullRepository: DepartmentRepository + EmployeeRepository {
    /// Verify the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
