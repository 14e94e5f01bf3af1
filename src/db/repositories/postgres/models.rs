use chrono::NaiveDate;
use diesel::prelude::*;

use super::schema::{departments, employees};
use crate::api::{
    Department, DepartmentId, DepartmentPatch, Employee, EmployeeId, EmployeePatch, NewDepartment,
    NewEmployee,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DepartmentRow {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = departments)]
pub struct NewDepartmentRow {
    pub title: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = departments)]
pub struct DepartmentChangeset {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EmployeeRow {
    pub id: i32,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub salary: i32,
    pub department_id: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = employees)]
pub struct NewEmployeeRow {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub salary: i32,
    pub department_id: i32,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = employees)]
pub struct EmployeeChangeset {
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub salary: Option<i32>,
    pub department_id: Option<i32>,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Department {
            id: DepartmentId::new(row.id),
            title: row.title,
        }
    }
}

impl From<NewDepartment> for NewDepartmentRow {
    fn from(new: NewDepartment) -> Self {
        NewDepartmentRow { title: new.title }
    }
}

impl From<DepartmentPatch> for DepartmentChangeset {
    fn from(patch: DepartmentPatch) -> Self {
        DepartmentChangeset { title: patch.title }
    }
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: EmployeeId::new(row.id),
            full_name: row.full_name,
            date_of_birth: row.date_of_birth,
            salary: row.salary,
            department_id: DepartmentId::new(row.department_id),
        }
    }
}

impl From<NewEmployee> for NewEmployeeRow {
    fn from(new: NewEmployee) -> Self {
        NewEmployeeRow {
            full_name: new.full_name,
            date_of_birth: new.date_of_birth,
            salary: new.salary,
            department_id: new.department_id.value(),
        }
    }
}

impl From<EmployeePatch> for EmployeeChangeset {
    fn from(patch: EmployeePatch) -> Self {
        EmployeeChangeset {
            full_name: patch.full_name,
            date_of_birth: patch.date_of_birth,
            salary: patch.salary,
            department_id: patch.department_id.map(|id| id.value()),
        }
    }
}
