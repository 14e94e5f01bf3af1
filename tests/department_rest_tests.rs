//! Functional tests for the department REST resources.
//!
//! The handlers are invoked directly with axum extractors over an in-memory
//! repository seeded with the demo fixture, mirroring real request flows
//! without a running server.

#![cfg(feature = "http-server")]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use department_service::api::Department;
use department_service::db::population;
use department_service::db::repositories::LocalRepository;
use department_service::db::services;
use department_service::http::error::AppError;
use department_service::http::{handlers, AppState};
use std::sync::Arc;

async fn seeded_state() -> (AppState, Vec<Department>) {
    let repo = Arc::new(LocalRepository::new());
    let departments = population::populate(repo.as_ref()).await.unwrap();
    (AppState::new(repo), departments)
}

fn not_found_message(err: AppError) -> String {
    match err {
        AppError::NotFound(msg) => msg,
        other => panic!("expected NotFound, got {:?}", other),
    }
}

fn bad_request_message(err: AppError) -> String {
    match err {
        AppError::BadRequest(msg) => msg,
        other => panic!("expected BadRequest, got {:?}", other),
    }
}

// Tests for GET requests

#[tokio::test]
async fn test_departments_get_all() {
    let (state, _) = seeded_state().await;

    let Json(departments) = handlers::list_departments(State(state)).await.unwrap();
    assert_eq!(departments.len(), 3);
    assert_eq!(departments[0].title, "Python");
    // Python staff salaries: 1500, 1000, 1000, 2000.
    assert_eq!(departments[0].avg_salary, 1375);
}

#[tokio::test]
async fn test_departments_get_with_id() {
    let (state, _) = seeded_state().await;

    let Json(department) = handlers::get_department(State(state), Path(1)).await.unwrap();
    assert_eq!(department.title, "Python");
    assert_eq!(department.employees.len(), 4);
}

#[tokio::test]
async fn test_departments_get_with_nonexistent_id() {
    let (state, _) = seeded_state().await;

    let err = handlers::get_department(State(state), Path(42)).await.unwrap_err();
    assert_eq!(
        not_found_message(err),
        "Department with id = 42 was not found"
    );
}

// Tests for POST requests

#[tokio::test]
async fn test_departments_post() {
    let (state, _) = seeded_state().await;

    let (status, Json(department)) =
        handlers::create_department(State(state.clone()), Json(json!({"title": "PHP"})))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(department.title, "PHP");
    assert_eq!(department.avg_salary, 0);
    assert!(department.employees.is_empty());

    let Json(departments) = handlers::list_departments(State(state)).await.unwrap();
    assert_eq!(departments.len(), 4);
}

#[tokio::test]
async fn test_departments_post_wrong_data() {
    let (state, _) = seeded_state().await;

    let err = handlers::create_department(State(state), Json(json!({"name": "PHP"})))
        .await
        .unwrap_err();
    match err {
        AppError::Validation(errors) => {
            assert_eq!(errors.field("title"), ["title is required"]);
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_departments_post_duplicate_name() {
    let (state, _) = seeded_state().await;

    let err = handlers::create_department(State(state), Json(json!({"title": "Python"})))
        .await
        .unwrap_err();
    assert_eq!(bad_request_message(err), "Department names should be unique");
}

// Tests for PUT requests

#[tokio::test]
async fn test_departments_put_with_id() {
    let (state, _) = seeded_state().await;

    let Json(department) = handlers::update_department(
        State(state.clone()),
        Path(1),
        Json(json!({"title": "Python Updated"})),
    )
    .await
    .unwrap();
    assert_eq!(department.title, "Python Updated");

    // Employees stay attached through the rename.
    assert_eq!(department.employees.len(), 4);
}

#[tokio::test]
async fn test_departments_put_with_nonexistent_id() {
    let (state, _) = seeded_state().await;

    let err = handlers::update_department(
        State(state),
        Path(42),
        Json(json!({"title": "Python Updated"})),
    )
    .await
    .unwrap_err();
    assert_eq!(
        not_found_message(err),
        "Department with id = 42 was not found"
    );
}

#[tokio::test]
async fn test_departments_put_with_id_wrong_data() {
    let (state, _) = seeded_state().await;

    let err = handlers::update_department(State(state), Path(1), Json(json!({"name": "Python+"})))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_departments_put_with_id_duplicate_name() {
    let (state, _) = seeded_state().await;

    let err = handlers::update_department(State(state), Path(1), Json(json!({"title": "C++"})))
        .await
        .unwrap_err();
    assert_eq!(bad_request_message(err), "Department names should be unique");
}

#[tokio::test]
async fn test_departments_put_keeping_own_title_is_allowed() {
    let (state, _) = seeded_state().await;

    let Json(department) =
        handlers::update_department(State(state), Path(1), Json(json!({"title": "Python"})))
            .await
            .unwrap();
    assert_eq!(department.title, "Python");
}

// Tests for DELETE requests

#[tokio::test]
async fn test_departments_delete() {
    let (state, _) = seeded_state().await;

    let status = handlers::delete_department(State(state.clone()), Path(1))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Department 1 had 4 of the 10 seeded employees; the cascade leaves 6.
    let Json(departments) = handlers::list_departments(State(state.clone())).await.unwrap();
    assert_eq!(departments.len(), 2);
    let Json(employees) = handlers::list_employees(State(state)).await.unwrap();
    assert_eq!(employees.len(), 6);
}

#[tokio::test]
async fn test_departments_delete_with_nonexistent_id() {
    let (state, _) = seeded_state().await;

    let err = handlers::delete_department(State(state), Path(42))
        .await
        .unwrap_err();
    assert_eq!(
        not_found_message(err),
        "Department with id = 42 was not found"
    );
}

// Tests for the department-scoped employee collection

#[tokio::test]
async fn test_department_employees_get() {
    let (state, _) = seeded_state().await;

    let Json(employees) = handlers::list_department_employees(State(state), Path(2))
        .await
        .unwrap();
    assert_eq!(employees.len(), 4);
    assert!(employees.iter().all(|e| e.department.title == "C++"));
}

#[tokio::test]
async fn test_department_employees_get_with_nonexistent_id() {
    let (state, _) = seeded_state().await;

    let err = handlers::list_department_employees(State(state), Path(42))
        .await
        .unwrap_err();
    assert_eq!(
        not_found_message(err),
        "Department with id = 42 was not found"
    );
}

#[tokio::test]
async fn test_department_employees_post() {
    let (state, departments) = seeded_state().await;

    let body = json!({
        "full_name": "Saira Coates",
        "date_of_birth": "1991-07-16",
        "salary": 1200
    });
    let (status, Json(employee)) =
        handlers::create_department_employee(State(state), Path(3), Json(body))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(employee.full_name, "Saira Coates");
    assert_eq!(employee.department.id, departments[2].id);
}

#[tokio::test]
async fn test_department_employees_post_url_id_wins() {
    let (state, departments) = seeded_state().await;

    // A department_id in the body is ignored in favor of the URL.
    let body = json!({
        "full_name": "Saira Coates",
        "date_of_birth": "1991-07-16",
        "salary": 1200,
        "department_id": 99
    });
    let (_, Json(employee)) = handlers::create_department_employee(State(state), Path(1), Json(body))
        .await
        .unwrap();
    assert_eq!(employee.department.id, departments[0].id);
}

#[tokio::test]
async fn test_department_employees_post_with_nonexistent_id() {
    let (state, _) = seeded_state().await;

    let body = json!({
        "full_name": "Saira Coates",
        "date_of_birth": "1991-07-16",
        "salary": 1200
    });
    let err = handlers::create_department_employee(State(state), Path(42), Json(body))
        .await
        .unwrap_err();
    assert_eq!(
        not_found_message(err),
        "Department with id = 42 was not found"
    );
}

#[tokio::test]
async fn test_department_employees_post_wrong_data() {
    let (state, _) = seeded_state().await;

    let err = handlers::create_department_employee(
        State(state),
        Path(1),
        Json(json!({"full_name": "Saira"})),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

// Status code mapping

#[tokio::test]
async fn test_error_status_codes() {
    let not_found = AppError::NotFound("Department with id = 42 was not found".to_string());
    assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

    let bad_request = AppError::BadRequest("Department names should be unique".to_string());
    assert_eq!(bad_request.into_response().status(), StatusCode::BAD_REQUEST);

    let mut errors = department_service::schemas::ValidationErrors::new();
    errors.push("title", "title is required");
    assert_eq!(
        AppError::Validation(errors).into_response().status(),
        StatusCode::BAD_REQUEST
    );

    let internal = AppError::Internal("store outage".to_string());
    assert_eq!(
        internal.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_title_round_trips_through_service_and_handler() {
    let (state, _) = seeded_state().await;

    let (_, Json(created)) =
        handlers::create_department(State(state.clone()), Json(json!({"title": "Rust"})))
            .await
            .unwrap();

    let stored = services::get_department(state.repository.as_ref(), created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Rust");

    let Json(fetched) = handlers::get_department(State(state), Path(created.id.value()))
        .await
        .unwrap();
    assert_eq!(fetched.title, "Rust");
}
