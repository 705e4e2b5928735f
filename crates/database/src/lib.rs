//! # Crossover Database Crate
//!
//! This crate is the storage collaborator of the crossover analyzer: it reads
//! the daily price series out of PostgreSQL and writes imported bars into it.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate encapsulates all database-specific logic and
//!   hides the SQL behind a small, typed API.
//! - **Explicit Handle:** There is no process-wide connection state. `connect` hands back a
//!   `PgPool` that the caller owns, passes to `DbRepository`, and closes on shutdown.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share one pool.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: Applies the embedded migrations, ensuring the schema is up-to-date.
//! - `DbRepository`: Holds the pool and provides the data access methods.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, pool_options, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;
