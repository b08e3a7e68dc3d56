//! Storage layer for the intercom kiosk.
//!
//! This crate provides SQLite-backed persistence for residents, visitors and
//! access logs, and the [`StoredValidator`] that runs the domain validator
//! against them.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool manager with automatic migrations
//! - [`ResidentRepository`], [`VisitorRepository`], [`AccessLogRepository`] - Data access traits
//! - [`StoredValidator`] - Load, validate, persist and audit in one transaction
//! - [`transaction`] - Transaction-aware operations used by the validator
//! - [`AccessReport`] - Summaries over the access log
//!
//! # Examples
//!
//! ## Checking a kiosk attempt
//!
//! ```no_run
//! use intercom_storage::{Database, DatabaseConfig, StoredValidator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DatabaseConfig {
//!     kiosks: 4,
//!     ..DatabaseConfig::new("intercom.db")
//! };
//! let db = Database::open(&config).await?;
//! let validator = StoredValidator::new(db.pool().clone());
//!
//! let verdict = validator.check("204", "4521").await?;
//! if verdict.is_granted() {
//!     println!("door open");
//! } else {
//!     println!("{}", verdict.display_message());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Registering a visitor
//!
//! ```no_run
//! use intercom_storage::{Database, DatabaseConfig};
//! use intercom_storage::models::Visitor;
//! use intercom_storage::repositories::{SqliteVisitorRepository, VisitorRepository};
//! use chrono::{Duration, Utc};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::open(&DatabaseConfig::new("intercom.db")).await?;
//! let visitors = SqliteVisitorRepository::new(db.pool().clone());
//!
//! let pass = Visitor::new("Carlos Lima", "204", "4521")
//!     .multiple(Some(3))
//!     .expires_at(Utc::now() + Duration::days(2));
//!
//! let id = visitors.create(&pass).await?;
//! println!("visitor {id} registered");
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! Passcodes are compared in constant time by the domain validator, are
//! skipped when models are serialized and are never written to the access log.
//! All queries use parameterized statements.

pub mod connection;
pub mod error;
pub mod models;
pub mod report;
pub mod repositories;
pub mod transaction;
pub mod validator;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::{AccessLog, Resident, Visitor};
pub use report::{AccessReport, UnitActivity};
pub use repositories::{
    AccessLogRepository, ResidentRepository, SqliteAccessLogRepository,
    SqliteResidentRepository, SqliteVisitorRepository, VisitorRepository,
};
pub use validator::{StoredValidator, ValidatorConfig};
