use thiserror::Error;

/// Storage-specific error types for the Rollcall record store.
///
/// These errors represent failures in database operations and in the
/// validation of student records before they are written.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Entity not found in database
    #[error("Entity not found: {entity_type} with {field}={value}")]
    NotFound {
        entity_type: String,
        field: String,
        value: String,
    },

    /// A record with the same natural key already exists
    #[error("Duplicate {entity_type}: {field}={value} already exists")]
    Duplicate {
        entity_type: String,
        field: String,
        value: String,
    },

    /// Data validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Create a not-found error for a student looked up by `field`.
    pub fn student_not_found(field: &str, value: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Student".to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Whether this is a [`StorageError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_not_found_display() {
        let error = StorageError::student_not_found("student_code", "S-001");
        assert!(error.is_not_found());
        assert_eq!(
            error.to_string(),
            "Entity not found: Student with student_code=S-001"
        );
    }

    #[test]
    fn test_validation_is_not_not_found() {
        let error = StorageError::Validation("name must not be empty".into());
        assert!(!error.is_not_found());
        assert_eq!(error.to_string(), "Validation error: name must not be empty");
    }
}
