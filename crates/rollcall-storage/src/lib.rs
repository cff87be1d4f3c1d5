//! Record store for the Rollcall attendance system.
//!
//! This crate provides SQLite-backed persistence for students and their
//! enrolled fingerprint templates. The fingerprint pipeline hands it a
//! [`FingerprintTemplate`](rollcall_biometric::FingerprintTemplate) keyed
//! by student code, and reads back every enrolled template when a capture
//! has to be identified.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool manager with embedded migrations
//! - [`StudentRepository`] - Data access trait, [`SqliteStudentRepository`]
//!   its SQLite implementation
//!
//! # Examples
//!
//! ```no_run
//! use rollcall_biometric::FingerprintTemplate;
//! use rollcall_storage::{Database, DatabaseConfig, SqliteStudentRepository, StudentRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::open(DatabaseConfig::new("rollcall.db")).await?;
//! let students = SqliteStudentRepository::new(db.pool().clone());
//!
//! students.create_student("Ada Obi", "S-001").await?;
//!
//! let template = FingerprintTemplate::from_capture(&[0x10; 512]);
//! students.update_fingerprint("S-001", &template).await?;
//!
//! for student in students.find_enrolled().await? {
//!     println!("{} is enrolled", student.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! Templates are stored as plain base64 text. They are biometric data;
//! deployments holding real captures should put the database on an
//! encrypted volume.
//!
//! All queries use parameterized statements via SQLx.

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;

pub use connection::{DEFAULT_DATABASE_PATH, Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::Student;
pub use repositories::{SqliteStudentRepository, StudentRepository};
