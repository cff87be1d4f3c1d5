pub mod student;

pub use student::{SqliteStudentRepository, StudentRepository};
