//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task;

use crate::api::{
    Department, DepartmentId, DepartmentPatch, Employee, EmployeeId, EmployeePatch, NewDepartment,
    NewEmployee,
};
use crate::db::repository::{
    DepartmentRepository, EmployeeRepository, ErrorContext, FullRepository, RepositoryError,
    RepositoryResult,
};

mod models;
mod schema;

use models::*;
use schema::{departments, employees};

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: std::sync::Arc<AtomicU64>,
    failed_queries: std::sync::Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: std::sync::Arc::new(AtomicU64::new(0)),
            failed_queries: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a blocking database operation on a pooled connection.
    ///
    /// Diesel is synchronous; the closure runs on the blocking thread pool so
    /// the async runtime is never stalled by a query.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                failed_queries.fetch_add(1, Ordering::Relaxed);
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection"),
                )
            })?;

            total_queries.fetch_add(1, Ordering::Relaxed);
            f(&mut conn).inspect_err(|_| {
                failed_queries.fetch_add(1, Ordering::Relaxed);
            })
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
        }
    }

    /// Check if the database connection is healthy.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}

#[async_trait]
impl DepartmentRepository for PostgresRepository {
    async fn list_departments(&self) -> RepositoryResult<Vec<Department>> {
        self.with_conn(|conn| {
            let rows = departments::table
                .order(departments::id.asc())
                .load::<DepartmentRow>(conn)
                .map_err(RepositoryError::from)?;
            Ok(rows.into_iter().map(Department::from).collect())
        })
        .await
        .map_err(|e| e.with_operation("list_departments"))
    }

    async fn find_department(&self, id: DepartmentId) -> RepositoryResult<Option<Department>> {
        self.with_conn(move |conn| {
            let row = departments::table
                .find(id.value())
                .first::<DepartmentRow>(conn)
                .optional()
                .map_err(RepositoryError::from)?;
            Ok(row.map(Department::from))
        })
        .await
        .map_err(|e| e.with_operation("find_department"))
    }

    async fn insert_department(&self, new: NewDepartment) -> RepositoryResult<Department> {
        self.with_conn(move |conn| {
            let row = diesel::insert_into(departments::table)
                .values(NewDepartmentRow::from(new))
                .get_result::<DepartmentRow>(conn)
                .map_err(RepositoryError::from)?;
            Ok(Department::from(row))
        })
        .await
        .map_err(|e| e.with_operation("insert_department"))
    }

    async fn update_department(
        &self,
        id: DepartmentId,
        patch: DepartmentPatch,
    ) -> RepositoryResult<Department> {
        self.with_conn(move |conn| {
            // Diesel rejects an all-default changeset, so an empty patch is a
            // plain read of the current row.
            if patch.is_empty() {
                let row = departments::table
                    .find(id.value())
                    .first::<DepartmentRow>(conn)
                    .map_err(RepositoryError::from)?;
                return Ok(Department::from(row));
            }

            let row = diesel::update(departments::table.find(id.value()))
                .set(DepartmentChangeset::from(patch))
                .get_result::<DepartmentRow>(conn)
                .map_err(RepositoryError::from)?;
            Ok(Department::from(row))
        })
        .await
        .map_err(|e| e.with_operation("update_department"))
    }

    async fn delete_department(&self, id: DepartmentId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            // Employees go with the department via ON DELETE CASCADE.
            let deleted = diesel::delete(departments::table.find(id.value()))
                .execute(conn)
                .map_err(RepositoryError::from)?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Department {} not found", id),
                    ErrorContext::new("delete_department")
                        .with_entity("department")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl EmployeeRepository for PostgresRepository {
    async fn list_employees(&self) -> RepositoryResult<Vec<Employee>> {
        self.with_conn(|conn| {
            let rows = employees::table
                .order(employees::id.asc())
                .load::<EmployeeRow>(conn)
                .map_err(RepositoryError::from)?;
            Ok(rows.into_iter().map(Employee::from).collect())
        })
        .await
        .map_err(|e| e.with_operation("list_employees"))
    }

    async fn employees_in_department(
        &self,
        department_id: DepartmentId,
    ) -> RepositoryResult<Vec<Employee>> {
        self.with_conn(move |conn| {
            let rows = employees::table
                .filter(employees::department_id.eq(department_id.value()))
                .order(employees::id.asc())
                .load::<EmployeeRow>(conn)
                .map_err(RepositoryError::from)?;
            Ok(rows.into_iter().map(Employee::from).collect())
        })
        .await
        .map_err(|e| e.with_operation("employees_in_department"))
    }

    async fn find_employee(&self, id: EmployeeId) -> RepositoryResult<Option<Employee>> {
        self.with_conn(move |conn| {
            let row = employees::table
                .find(id.value())
                .first::<EmployeeRow>(conn)
                .optional()
                .map_err(RepositoryError::from)?;
            Ok(row.map(Employee::from))
        })
        .await
        .map_err(|e| e.with_operation("find_employee"))
    }

    async fn insert_employee(&self, new: NewEmployee) -> RepositoryResult<Employee> {
        self.with_conn(move |conn| {
            let row = diesel::insert_into(employees::table)
                .values(NewEmployeeRow::from(new))
                .get_result::<EmployeeRow>(conn)
                .map_err(RepositoryError::from)?;
            Ok(Employee::from(row))
        })
        .await
        .map_err(|e| e.with_operation("insert_employee"))
    }

    async fn update_employee(
        &self,
        id: EmployeeId,
        patch: EmployeePatch,
    ) -> RepositoryResult<Employee> {
        self.with_conn(move |conn| {
            if patch.is_empty() {
                let row = employees::table
                    .find(id.value())
                    .first::<EmployeeRow>(conn)
                    .map_err(RepositoryError::from)?;
                return Ok(Employee::from(row));
            }

            let row = diesel::update(employees::table.find(id.value()))
                .set(EmployeeChangeset::from(patch))
                .get_result::<EmployeeRow>(conn)
                .map_err(RepositoryError::from)?;
            Ok(Employee::from(row))
        })
        .await
        .map_err(|e| e.with_operation("update_employee"))
    }

    async fn delete_employee(&self, id: EmployeeId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(employees::table.find(id.value()))
                .execute(conn)
                .map_err(RepositoryError::from)?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Employee {} not found", id),
                    ErrorContext::new("delete_employee")
                        .with_entity("employee")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn employees_by_date_of_birth(
        &self,
        department_id: Option<DepartmentId>,
        date: NaiveDate,
        date_for_interval: Option<NaiveDate>,
    ) -> RepositoryResult<Vec<Employee>> {
        self.with_conn(move |conn| {
            let mut query = employees::table.into_boxed();

            query = match date_for_interval {
                None => query.filter(employees::date_of_birth.eq(date)),
                Some(upper) => query
                    .filter(employees::date_of_birth.ge(date))
                    .filter(employees::date_of_birth.le(upper)),
            };
            if let Some(dep) = department_id {
                query = query.filter(employees::department_id.eq(dep.value()));
            }

            let rows = query
                .order(employees::id.asc())
                .load::<EmployeeRow>(conn)
                .map_err(RepositoryError::from)?;
            Ok(rows.into_iter().map(Employee::from).collect())
        })
        .await
        .map_err(|e| e.with_operation("employees_by_date_of_birth"))
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map_err(RepositoryError::from)?;
            Ok(true)
        })
        .await
        .map_err(|e| e.with_operation("health_check"))
    }
}
