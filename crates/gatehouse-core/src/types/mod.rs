//! Core type definitions used across the Gatehouse workspace.

pub mod task;

pub use task::{AsyncTask, WorkerKind};
