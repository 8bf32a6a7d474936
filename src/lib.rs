//! `tasklists` - task lists with manual ordering, bounded undo, an archive and
//! crash-safe JSON persistence.

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod undo;

pub use app::Service;
pub use error::{ErrorKind, ServiceError};
