//! # Vantage Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL entity store that owns the back-office data.
//!
//! ## Architectural Principles
//!
//! - **Read-Only Adapter:** The KPI aggregation never writes. This crate
//!   exposes exactly the four full-collection reads the engine consumes,
//!   hiding the SQL behind a clean API.
//! - **All-or-Nothing Snapshots:** `fetch_snapshot` either returns one full,
//!   consistent read of all four collections or fails as a whole. A partial
//!   snapshot could be misleading for financial reporting.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share a
//!   connection pool (`PgPool`).
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: A utility to apply database migrations, ensuring the schema is up-to-date.
//! - `EntityRepository`: The main struct that holds the connection pool and
//!   provides the read operations (`list_contracts`, ..., `fetch_snapshot`).
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::EntityRepository;
