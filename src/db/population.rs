//! Demo data population.
//!
//! Seeds the store with a small fixture set (three departments, ten
//! employees) used by the integration tests and available for local
//! development runs.

use chrono::NaiveDate;

use crate::api::{Department, NewDepartment, NewEmployee};
use crate::db::repository::{FullRepository, RepositoryResult};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("fixture dates are valid")
}

/// Populate the repository with the demo fixture.
///
/// Returns the created departments in insertion order
/// (Python, C++, Assembler).
pub async fn populate(repo: &dyn FullRepository) -> RepositoryResult<Vec<Department>> {
    let mut departments = Vec::with_capacity(3);
    for title in ["Python", "C++", "Assembler"] {
        departments.push(
            repo.insert_department(NewDepartment {
                title: title.to_string(),
            })
            .await?,
        );
    }

    let fixture = [
        ("Vladyslav Radchenko", date(2002, 9, 9), 1500, 0),
        ("Rhian Sutherland", date(1992, 2, 2), 1000, 0),
        ("Dillan Dejesus", date(1973, 3, 3), 2000, 1),
        ("Evie Amin", date(1995, 4, 4), 2000, 1),
        ("Neil Wilson", date(1985, 5, 5), 2000, 1),
        ("Ayah Hobbs", date(1981, 1, 1), 1000, 0),
        ("Corban Snow", date(1962, 2, 2), 1000, 2),
        ("Carmel Boyle", date(1983, 3, 3), 2000, 2),
        ("Reema Hoover", date(1999, 4, 4), 2000, 0),
        ("Abdirahman Davidson", date(1995, 5, 5), 2000, 1),
    ];

    for (full_name, date_of_birth, salary, department_index) in fixture {
        repo.insert_employee(NewEmployee {
            full_name: full_name.to_string(),
            date_of_birth,
            salary,
            department_id: departments[department_index].id,
        })
        .await?;
    }

    Ok(departments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::EmployeeRepository;

    #[tokio::test]
    async fn test_populate_seeds_fixture() {
        let repo = LocalRepository::new();
        let departments = populate(&repo).await.unwrap();

        assert_eq!(departments.len(), 3);
        assert_eq!(departments[0].title, "Python");

        let employees = repo.list_employees().await.unwrap();
        assert_eq!(employees.len(), 10);

        // Department 1 (Python) owns four of the seeded employees.
        let python_staff = repo.employees_in_department(departments[0].id).await.unwrap();
        assert_eq!(python_staff.len(), 4);
    }
}
