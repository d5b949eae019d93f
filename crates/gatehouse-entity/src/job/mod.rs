//! Background job domain entities.

pub mod model;
pub mod status;

pub use model::{CreateJob, Job};
pub use status::JobStatus;
