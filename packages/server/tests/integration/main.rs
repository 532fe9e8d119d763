mod common;

mod admin;
mod archive;
mod enrollment;
mod grading;
mod messages;
