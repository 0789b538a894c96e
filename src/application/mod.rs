//! Application services layer: collaborator contracts and export jobs.

pub mod error;
pub mod jobs;
pub mod repos;
