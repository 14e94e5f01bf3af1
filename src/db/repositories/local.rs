//! In-memory repository implementation for unit testing and local development.
//!
//! Mirrors the observable semantics of the Postgres backend: insertion-ordered
//! listings, title uniqueness, foreign key integrity, and cascade delete of a
//! department's employees.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::api::{
    Department, DepartmentId, DepartmentPatch, Employee, EmployeeId, EmployeePatch, NewDepartment,
    NewEmployee,
};
use crate::db::repository::{
    DepartmentRepository, EmployeeRepository, ErrorContext, FullRepository, RepositoryError,
    RepositoryResult,
};

#[derive(Debug, Default)]
struct Store {
    departments: BTreeMap<i32, Department>,
    employees: BTreeMap<i32, Employee>,
    next_department_id: i32,
    next_employee_id: i32,
}

/// In-memory repository guarded by a single read-write lock.
#[derive(Debug, Default)]
pub struct LocalRepository {
    store: RwLock<Store>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store {
                next_department_id: 1,
                next_employee_id: 1,
                ..Default::default()
            }),
        }
    }
}

fn duplicate_title_error(title: &str, operation: &str) -> RepositoryError {
    RepositoryError::unique_violation_with_context(
        format!("Department title '{}' already exists", title),
        ErrorContext::new(operation).with_entity("department"),
    )
}

fn missing_department_error(id: DepartmentId, operation: &str) -> RepositoryError {
    RepositoryError::foreign_key_violation_with_context(
        format!("Department {} does not exist", id),
        ErrorContext::new(operation)
            .with_entity("employee")
            .with_details(format!("department_id={}", id)),
    )
}

fn department_not_found(id: DepartmentId, operation: &str) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Department {} not found", id),
        ErrorContext::new(operation)
            .with_entity("department")
            .with_entity_id(id),
    )
}

fn employee_not_found(id: EmployeeId, operation: &str) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Employee {} not found", id),
        ErrorContext::new(operation)
            .with_entity("employee")
            .with_entity_id(id),
    )
}

#[async_trait]
impl DepartmentRepository for LocalRepository {
    async fn list_departments(&self) -> RepositoryResult<Vec<Department>> {
        let store = self.store.read();
        Ok(store.departments.values().cloned().collect())
    }

    async fn find_department(&self, id: DepartmentId) -> RepositoryResult<Option<Department>> {
        let store = self.store.read();
        Ok(store.departments.get(&id.value()).cloned())
    }

    async fn insert_department(&self, new: NewDepartment) -> RepositoryResult<Department> {
        let mut store = self.store.write();

        if store.departments.values().any(|d| d.title == new.title) {
            return Err(duplicate_title_error(&new.title, "insert_department"));
        }

        let id = store.next_department_id;
        store.next_department_id += 1;

        let department = Department {
            id: DepartmentId::new(id),
            title: new.title,
        };
        store.departments.insert(id, department.clone());
        Ok(department)
    }

    async fn update_department(
        &self,
        id: DepartmentId,
        patch: DepartmentPatch,
    ) -> RepositoryResult<Department> {
        let mut guard = self.store.write();
        let store = &mut *guard;

        let title_conflict = patch.title.as_ref().is_some_and(|title| {
            store
                .departments
                .values()
                .any(|d| d.id != id && d.title == *title)
        });

        let Some(department) = store.departments.get_mut(&id.value()) else {
            return Err(department_not_found(id, "update_department"));
        };
        if title_conflict {
            return Err(duplicate_title_error(
                patch.title.as_deref().unwrap_or_default(),
                "update_department",
            ));
        }

        if let Some(title) = patch.title {
            department.title = title;
        }
        Ok(department.clone())
    }

    async fn delete_department(&self, id: DepartmentId) -> RepositoryResult<()> {
        let mut store = self.store.write();

        if store.departments.remove(&id.value()).is_none() {
            return Err(department_not_found(id, "delete_department"));
        }

        // Cascade: a department owns its employees.
        store.employees.retain(|_, e| e.department_id != id);
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for LocalRepository {
    async fn list_employees(&self) -> RepositoryResult<Vec<Employee>> {
        let store = self.store.read();
        Ok(store.employees.values().cloned().collect())
    }

    async fn employees_in_department(
        &self,
        department_id: DepartmentId,
    ) -> RepositoryResult<Vec<Employee>> {
        let store = self.store.read();
        Ok(store
            .employees
            .values()
            .filter(|e| e.department_id == department_id)
            .cloned()
            .collect())
    }

    async fn find_employee(&self, id: EmployeeId) -> RepositoryResult<Option<Employee>> {
        let store = self.store.read();
        Ok(store.employees.get(&id.value()).cloned())
    }

    async fn insert_employee(&self, new: NewEmployee) -> RepositoryResult<Employee> {
        let mut store = self.store.write();

        if !store.departments.contains_key(&new.department_id.value()) {
            return Err(missing_department_error(new.department_id, "insert_employee"));
        }

        let id = store.next_employee_id;
        store.next_employee_id += 1;

        let employee = Employee {
            id: EmployeeId::new(id),
            full_name: new.full_name,
            date_of_birth: new.date_of_birth,
            salary: new.salary,
            department_id: new.department_id,
        };
        store.employees.insert(id, employee.clone());
        Ok(employee)
    }

    async fn update_employee(
        &self,
        id: EmployeeId,
        patch: EmployeePatch,
    ) -> RepositoryResult<Employee> {
        let mut guard = self.store.write();
        let store = &mut *guard;

        if let Some(department_id) = patch.department_id {
            if !store.departments.contains_key(&department_id.value()) {
                return Err(missing_department_error(department_id, "update_employee"));
            }
        }

        let Some(employee) = store.employees.get_mut(&id.value()) else {
            return Err(employee_not_found(id, "update_employee"));
        };
        if let Some(full_name) = patch.full_name {
            employee.full_name = full_name;
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            employee.date_of_birth = date_of_birth;
        }
        if let Some(salary) = patch.salary {
            employee.salary = salary;
        }
        if let Some(department_id) = patch.department_id {
            employee.department_id = department_id;
        }
        Ok(employee.clone())
    }

    async fn delete_employee(&self, id: EmployeeId) -> RepositoryResult<()> {
        let mut store = self.store.write();

        if store.employees.remove(&id.value()).is_none() {
            return Err(employee_not_found(id, "delete_employee"));
        }
        Ok(())
    }

    async fn employees_by_date_of_birth(
        &self,
        department_id: Option<DepartmentId>,
        date: NaiveDate,
        date_for_interval: Option<NaiveDate>,
    ) -> RepositoryResult<Vec<Employee>> {
        let store = self.store.read();
        let matches = store
            .employees
            .values()
            .filter(|e| match date_for_interval {
                None => e.date_of_birth == date,
                Some(upper) => date <= e.date_of_birth && e.date_of_birth <= upper,
            })
            .filter(|e| department_id.is_none_or(|dep| e.department_id == dep))
            .cloned()
            .collect();
        Ok(matches)
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_employee(name: &str, dep: i32) -> NewEmployee {
        NewEmployee {
            full_name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            salary: 1000,
            department_id: DepartmentId::new(dep),
        }
    }

    #[tokio::test]
    async fn test_insert_department_assigns_sequential_ids() {
        let repo = LocalRepository::new();
        let first = repo
            .insert_department(NewDepartment {
                title: "Python".to_string(),
            })
            .await
            .unwrap();
        let second = repo
            .insert_department(NewDepartment {
                title: "C++".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(first.id.value(), 1);
        assert_eq!(second.id.value(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_title_rejected() {
        let repo = LocalRepository::new();
        repo.insert_department(NewDepartment {
            title: "Python".to_string(),
        })
        .await
        .unwrap();

        let result = repo
            .insert_department(NewDepartment {
                title: "Python".to_string(),
            })
            .await;
        assert!(matches!(
            result,
            Err(RepositoryError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_insert_employee_requires_existing_department() {
        let repo = LocalRepository::new();
        let result = repo.insert_employee(new_employee("Neil Wilson", 42)).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ForeignKeyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_department_cascades_to_employees() {
        let repo = LocalRepository::new();
        let python = repo
            .insert_department(NewDepartment {
                title: "Python".to_string(),
            })
            .await
            .unwrap();
        let cpp = repo
            .insert_department(NewDepartment {
                title: "C++".to_string(),
            })
            .await
            .unwrap();
        repo.insert_employee(new_employee("Neil Wilson", python.id.value()))
            .await
            .unwrap();
        repo.insert_employee(new_employee("Evie Amin", python.id.value()))
            .await
            .unwrap();
        let survivor = repo
            .insert_employee(new_employee("Corban Snow", cpp.id.value()))
            .await
            .unwrap();

        repo.delete_department(python.id).await.unwrap();

        let remaining = repo.list_employees().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, survivor.id);
    }

    #[tokio::test]
    async fn test_update_employee_applies_only_set_fields() {
        let repo = LocalRepository::new();
        let dep = repo
            .insert_department(NewDepartment {
                title: "Python".to_string(),
            })
            .await
            .unwrap();
        let employee = repo
            .insert_employee(new_employee("Neil Wilson", dep.id.value()))
            .await
            .unwrap();

        let updated = repo
            .update_employee(
                employee.id,
                EmployeePatch {
                    full_name: Some("Neil Hobbs".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.full_name, "Neil Hobbs");
        assert_eq!(updated.salary, employee.salary);
        assert_eq!(updated.date_of_birth, employee.date_of_birth);
        assert_eq!(updated.department_id, employee.department_id);
    }
}
