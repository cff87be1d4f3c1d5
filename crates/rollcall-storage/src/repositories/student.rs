#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::Student;
use rollcall_biometric::FingerprintTemplate;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Repository trait for student records and their fingerprints
///
/// Students are addressed by their school-issued `student_code` for every
/// fingerprint operation, the same key enrollment requests carry.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// so it is used through generics rather than as a trait object.
pub trait StudentRepository: Send + Sync {
    /// Create a student without a fingerprint and return its id
    async fn create_student(&self, name: &str, student_code: &str) -> StorageResult<i64>;

    /// Find a student by id
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Student>>;

    /// Find a student by student code
    async fn find_by_code(&self, student_code: &str) -> StorageResult<Option<Student>>;

    /// Store `template` as the student's fingerprint and mark them enrolled
    ///
    /// Replaces any previously enrolled fingerprint.
    async fn update_fingerprint(
        &self,
        student_code: &str,
        template: &FingerprintTemplate,
    ) -> StorageResult<()>;

    /// Clear the student's fingerprint and reset the enrolled flag
    async fn remove_fingerprint(&self, student_code: &str) -> StorageResult<()>;

    /// Find the enrolled student whose stored template equals `template` exactly
    async fn find_by_fingerprint(&self, template: &str) -> StorageResult<Option<Student>>;

    /// All students with an enrolled fingerprint, ordered by id
    async fn find_enrolled(&self) -> StorageResult<Vec<Student>>;
}

/// SQLite implementation of StudentRepository
#[derive(Debug, Clone)]
pub struct SqliteStudentRepository {
    pool: SqlitePool,
}

impl SqliteStudentRepository {
    /// Create a new SQLite student repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn require_non_empty(field: &str, value: &str) -> StorageResult<()> {
    if value.trim().is_empty() {
        return Err(StorageError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl StudentRepository for SqliteStudentRepository {
    async fn create_student(&self, name: &str, student_code: &str) -> StorageResult<i64> {
        require_non_empty("name", name)?;
        require_non_empty("student_code", student_code)?;

        let result = sqlx::query("INSERT INTO students (name, student_code) VALUES (?, ?)")
            .bind(name.trim())
            .bind(student_code.trim())
            .execute(&self.pool)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db) if db.is_unique_violation() => StorageError::Duplicate {
                    entity_type: "Student".to_string(),
                    field: "student_code".to_string(),
                    value: student_code.trim().to_string(),
                },
                _ => StorageError::Database(e),
            })?;

        let id = result.last_insert_rowid();
        debug!("Created student {} with id {}", student_code, id);
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, student_code, name,
                   fingerprint_data, fingerprint_enrolled, fingerprint_quality,
                   enrolled_at, created_at, updated_at
            FROM students
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn find_by_code(&self, student_code: &str) -> StorageResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, student_code, name,
                   fingerprint_data, fingerprint_enrolled, fingerprint_quality,
                   enrolled_at, created_at, updated_at
            FROM students
            WHERE student_code = ?
            "#,
        )
        .bind(student_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn update_fingerprint(
        &self,
        student_code: &str,
        template: &FingerprintTemplate,
    ) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET fingerprint_data = ?, fingerprint_enrolled = 1,
                fingerprint_quality = ?, enrolled_at = ?,
                updated_at = datetime('now')
            WHERE student_code = ?
            "#,
        )
        .bind(&template.template)
        .bind(template.quality)
        .bind(template.timestamp)
        .bind(student_code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::student_not_found("student_code", student_code));
        }

        info!(
            "Fingerprint enrolled for student {} (quality {})",
            student_code, template.quality
        );
        Ok(())
    }

    async fn remove_fingerprint(&self, student_code: &str) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET fingerprint_data = NULL, fingerprint_enrolled = 0,
                fingerprint_quality = NULL, enrolled_at = NULL,
                updated_at = datetime('now')
            WHERE student_code = ?
            "#,
        )
        .bind(student_code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::student_not_found("student_code", student_code));
        }

        info!("Fingerprint removed for student {}", student_code);
        Ok(())
    }

    async fn find_by_fingerprint(&self, template: &str) -> StorageResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, student_code, name,
                   fingerprint_data, fingerprint_enrolled, fingerprint_quality,
                   enrolled_at, created_at, updated_at
            FROM students
            WHERE fingerprint_data = ? AND fingerprint_enrolled = 1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(template)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn find_enrolled(&self) -> StorageResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, student_code, name,
                   fingerprint_data, fingerprint_enrolled, fingerprint_quality,
                   enrolled_at, created_at, updated_at
            FROM students
            WHERE fingerprint_enrolled = 1
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("Loaded {} enrolled student(s)", students.len());
        Ok(students)
    }
}
