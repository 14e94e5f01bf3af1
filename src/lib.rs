//! # Department Service
//!
//! CRUD backend for managing organizational departments and their employees.
//!
//! The crate exposes a REST API via Axum backed by a relational store:
//! departments own employees, deleting a department cascades to its
//! employees, and the API serves nested JSON representations with a derived
//! average salary per department.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Domain entity types shared across layers
//! - [`schemas`]: Inbound payload validation and outbound JSON shaping
//! - [`db`]: Database operations, repository pattern, and persistence layer
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! Two storage backends implement the repository traits: a Diesel/Postgres
//! backend for production (`postgres-repo` feature) and an in-memory backend
//! for tests and local development (`local-repo` feature, default).

pub mod api;

pub mod db;

pub mod schemas;

#[cfg(feature = "http-server")]
pub mod http;
