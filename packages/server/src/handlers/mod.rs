pub mod archive;
pub mod auth;
pub mod enrollment;
pub mod grading;
pub mod history;
pub mod log;
pub mod message;
pub mod report;
pub mod student;
pub mod subject;
