pub mod job;
pub mod resume;
