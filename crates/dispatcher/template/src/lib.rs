pub mod environment;
pub mod functions;
pub mod job;
pub mod walker;

pub use self::{environment::Environment, job::build_job};
