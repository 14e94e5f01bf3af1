use super::*;
use serde_json::json;

use crate::api::NewDepartment;
use crate::db::repositories::LocalRepository;
use crate::db::services;

// =============================================================================
// Department loading
// =============================================================================

#[test]
fn test_load_department_valid() {
    let fields = load_department(&json!({"title": "PHP"})).unwrap();
    assert_eq!(fields, NewDepartment { title: "PHP".to_string() });
}

#[test]
fn test_load_department_missing_title() {
    let errors = load_department(&json!({"name": "PHP"})).unwrap_err();
    assert_eq!(errors.field("title"), ["title is required"]);
}

#[test]
fn test_load_department_title_too_short() {
    let errors = load_department(&json!({"title": "ab"})).unwrap_err();
    assert_eq!(errors.field("title"), ["Length must be between 3 and 128."]);
}

#[test]
fn test_load_department_title_too_long() {
    let errors = load_department(&json!({"title": "x".repeat(129)})).unwrap_err();
    assert_eq!(errors.field("title"), ["Length must be between 3 and 128."]);
}

#[test]
fn test_load_department_title_boundaries() {
    assert!(load_department(&json!({"title": "abc"})).is_ok());
    assert!(load_department(&json!({"title": "x".repeat(128)})).is_ok());
}

#[test]
fn test_load_department_title_not_a_string() {
    let errors = load_department(&json!({"title": 42})).unwrap_err();
    assert_eq!(errors.field("title"), ["Not a valid string."]);
}

#[test]
fn test_load_department_ignores_unknown_keys() {
    let fields = load_department(&json!({"title": "PHP", "budget": 100})).unwrap();
    assert_eq!(fields.title, "PHP");
}

// =============================================================================
// Employee loading
// =============================================================================

fn valid_employee_body() -> Value {
    json!({
        "full_name": "Dillan Dejesus",
        "date_of_birth": "1973-03-03",
        "salary": 2000,
        "department_id": 2
    })
}

#[test]
fn test_load_new_employee_valid() {
    let fields = load_new_employee(&valid_employee_body(), None).unwrap();
    assert_eq!(fields.full_name, "Dillan Dejesus");
    assert_eq!(
        fields.date_of_birth,
        NaiveDate::from_ymd_opt(1973, 3, 3).unwrap()
    );
    assert_eq!(fields.salary, 2000);
    assert_eq!(fields.department_id, DepartmentId::new(2));
}

#[test]
fn test_full_name_single_token_rejected() {
    let mut body = valid_employee_body();
    body["full_name"] = json!("Dillan");
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(errors.field("full_name"), ["Wrong full name"]);
}

#[test]
fn test_full_name_with_digit_rejected() {
    let mut body = valid_employee_body();
    body["full_name"] = json!("Dillan D3jesus");
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(errors.field("full_name"), ["Wrong full name"]);
}

#[test]
fn test_full_name_three_tokens_rejected() {
    let mut body = valid_employee_body();
    body["full_name"] = json!("Dillan Middle Dejesus");
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(errors.field("full_name"), ["Wrong full name"]);
}

#[test]
fn test_full_name_hyphenated_rejected() {
    let mut body = valid_employee_body();
    body["full_name"] = json!("Mary-Jane Watson");
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(errors.field("full_name"), ["Wrong full name"]);
}

#[test]
fn test_full_name_too_short() {
    let mut body = valid_employee_body();
    body["full_name"] = json!("Al B");
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(errors.field("full_name"), ["Length must be between 6 and 128."]);
}

#[test]
fn test_full_name_missing() {
    let mut body = valid_employee_body();
    body.as_object_mut().unwrap().remove("full_name");
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(errors.field("full_name"), ["full name is required"]);
}

#[test]
fn test_salary_missing() {
    let mut body = valid_employee_body();
    body.as_object_mut().unwrap().remove("salary");
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(errors.field("salary"), ["salary is required"]);
}

#[test]
fn test_salary_negative() {
    let mut body = valid_employee_body();
    body["salary"] = json!(-1);
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(errors.field("salary"), ["Must be greater than or equal to 0."]);
}

#[test]
fn test_salary_not_an_integer() {
    let mut body = valid_employee_body();
    body["salary"] = json!("lots");
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(errors.field("salary"), ["Not a valid integer."]);
}

#[test]
fn test_date_of_birth_missing() {
    let mut body = valid_employee_body();
    body.as_object_mut().unwrap().remove("date_of_birth");
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(
        errors.field("date_of_birth"),
        ["Missing data for required field."]
    );
}

#[test]
fn test_date_of_birth_malformed() {
    let mut body = valid_employee_body();
    body["date_of_birth"] = json!("03/03/1973");
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(errors.field("date_of_birth"), ["Not a valid date."]);
}

#[test]
fn test_department_id_required_without_forced_id() {
    let mut body = valid_employee_body();
    body.as_object_mut().unwrap().remove("department_id");
    let errors = load_new_employee(&body, None).unwrap_err();
    assert_eq!(errors.field("department_id"), ["department_id is required"]);
}

#[test]
fn test_forced_department_id_overrides_body() {
    let fields = load_new_employee(&valid_employee_body(), Some(DepartmentId::new(7))).unwrap();
    assert_eq!(fields.department_id, DepartmentId::new(7));
}

#[test]
fn test_forced_department_id_allows_missing_body_field() {
    let mut body = valid_employee_body();
    body.as_object_mut().unwrap().remove("department_id");
    let fields = load_new_employee(&body, Some(DepartmentId::new(3))).unwrap();
    assert_eq!(fields.department_id, DepartmentId::new(3));
}

#[test]
fn test_errors_accumulate_across_fields() {
    let errors = load_new_employee(&json!({}), None).unwrap_err();
    assert!(!errors.field("full_name").is_empty());
    assert!(!errors.field("salary").is_empty());
    assert!(!errors.field("date_of_birth").is_empty());
    assert!(!errors.field("department_id").is_empty());
}

// =============================================================================
// Employee patches
// =============================================================================

#[test]
fn test_empty_patch_sets_nothing() {
    let patch = load_employee_patch(&json!({})).unwrap();
    assert!(patch.is_empty());
}

#[test]
fn test_patch_single_field() {
    let patch = load_employee_patch(&json!({"full_name": "Neil Hobbs"})).unwrap();
    assert_eq!(patch.full_name.as_deref(), Some("Neil Hobbs"));
    assert!(patch.salary.is_none());
    assert!(patch.date_of_birth.is_none());
    assert!(patch.department_id.is_none());
}

#[test]
fn test_patch_validates_present_fields() {
    let errors = load_employee_patch(&json!({"full_name": "N"})).unwrap_err();
    assert!(!errors.field("full_name").is_empty());
}

#[test]
fn test_patch_ignores_unknown_keys() {
    let patch = load_employee_patch(&json!({"nickname": "Neil"})).unwrap();
    assert!(patch.is_empty());
}

#[test]
fn test_parse_iso_date() {
    assert_eq!(
        parse_iso_date("date_of_birth", "1985-05-05").unwrap(),
        NaiveDate::from_ymd_opt(1985, 5, 5).unwrap()
    );
    let errors = parse_iso_date("date_for_interval", "85-05-05").unwrap_err();
    assert_eq!(errors.field("date_for_interval"), ["Not a valid date."]);
}

// =============================================================================
// Outbound shaping
// =============================================================================

async fn seeded_repo() -> (LocalRepository, Vec<Department>) {
    let repo = LocalRepository::new();
    let departments = crate::db::population::populate(&repo).await.unwrap();
    (repo, departments)
}

#[tokio::test]
async fn test_dump_department_shape() {
    let (repo, departments) = seeded_repo().await;
    let python = &departments[0];

    let out = dump_department(&repo, python).await.unwrap();
    assert_eq!(out.id, python.id);
    assert_eq!(out.title, "Python");
    assert_eq!(out.employees.len(), 4);

    // Python staff salaries are 1500, 1000, 1000, 2000.
    assert_eq!(out.avg_salary, 1375);

    let value = serde_json::to_value(&out).unwrap();
    assert!(value["employees"][0].get("department").is_none());
    assert_eq!(value["employees"][0]["full_name"], "Vladyslav Radchenko");
}

#[tokio::test]
async fn test_dump_department_empty_has_zero_avg() {
    let repo = LocalRepository::new();
    let dep = services::create_department(
        &repo,
        NewDepartment {
            title: "Assembler".to_string(),
        },
    )
    .await
    .unwrap();

    let out = dump_department(&repo, &dep).await.unwrap();
    assert_eq!(out.avg_salary, 0);
    assert!(out.employees.is_empty());
}

#[tokio::test]
async fn test_dump_employee_nests_short_department() {
    let (repo, departments) = seeded_repo().await;
    let employees = services::employees_in_department(&repo, departments[1].id)
        .await
        .unwrap();
    let dillan = employees
        .iter()
        .find(|e| e.full_name == "Dillan Dejesus")
        .unwrap();

    let out = dump_employee(&repo, dillan).await.unwrap();
    assert_eq!(out.department.id, departments[1].id);
    assert_eq!(out.department.title, "C++");
    // C++ staff all earn 2000.
    assert_eq!(out.department.avg_salary, 2000);

    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["date_of_birth"], "1973-03-03");
    assert!(value["department"].get("employees").is_none());
}

#[tokio::test]
async fn test_dump_employees_preserves_order() {
    let (repo, _) = seeded_repo().await;
    let employees = services::list_employees(&repo).await.unwrap();
    let out = dump_employees(&repo, &employees).await.unwrap();

    assert_eq!(out.len(), 10);
    assert_eq!(out[0].full_name, "Vladyslav Radchenko");
    assert_eq!(out[9].full_name, "Abdirahman Davidson");
}
