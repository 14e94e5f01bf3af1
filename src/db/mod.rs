//! Database module for department and employee storage.
//!
//! This module provides abstractions for database operations via the
//! Repository pattern, allowing different storage backends to be swapped
//! easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API)                           │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Persistence Operations   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────┬───────────────────────┐
//!     │       Local Repository       │  Postgres Repository  │
//!     │        (in-memory)           │    (Diesel + r2d2)    │
//!     └──────────────────────────────┴───────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! **For new code, use the service layer:**
//! ```ignore
//! use department_service::db::{factory::RepositoryFactory, services, RepositoryType};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::create(RepositoryType::Local, None).await?;
//!     let departments = services::list_departments(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```

// Feature flag priority: postgres > local
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod population;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;


// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    _private: (),
}

// ==================== Service Layer (Recommended for new code) ====================

pub use services::{
    create_department, create_employee, delete_department, delete_employee,
    employees_by_date_of_birth, employees_by_date_of_birth_in_department, employees_in_department,
    get_avg_salary, get_department, get_employee, health_check, list_departments, list_employees,
    update_department, update_employee,
};

// ==================== Repository Pattern Exports ====================

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    DepartmentRepository, EmployeeRepository, ErrorContext, FullRepository, RepositoryError,
    RepositoryResult,
};

use std::sync::Arc;

/// Construct the repository selected by configuration.
///
/// A `repository.toml` in a standard location wins; otherwise the backend is
/// chosen from the environment (`REPOSITORY_TYPE`, `DATABASE_URL`). The
/// returned handle is meant to be passed into the application state at
/// startup; no global store handle exists.
pub async fn connect_repository() -> RepositoryResult<Arc<dyn FullRepository>> {
    if let Ok(config) = RepositoryConfig::from_default_location() {
        return RepositoryFactory::from_config(&config).await;
    }

    match RepositoryType::from_env() {
        #[cfg(feature = "postgres-repo")]
        RepositoryType::Postgres => {
            let config = PostgresConfig::from_env().map_err(RepositoryError::configuration)?;
            let repo = RepositoryFactory::create_postgres(&config).await?;
            Ok(repo as Arc<dyn FullRepository>)
        }
        #[cfg(not(feature = "postgres-repo"))]
        RepositoryType::Postgres => Err(RepositoryError::configuration(
            "Postgres repository feature not enabled",
        )),
        RepositoryType::Local => Ok(RepositoryFactory::create_local()),
    }
}
