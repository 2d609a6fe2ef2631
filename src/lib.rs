//! Cleanliness complaint tracking: a report lifecycle over a single
//! persisted slot, with citizen, admin and agent views.

pub mod config;
pub mod error;
pub mod id;
pub mod models;
pub mod projection;
pub mod prompt;
pub mod render;
pub mod services;
pub mod store;
pub mod utils;

pub use error::{ReportError, Result};
pub use models::{NewReport, Report, ReportStatus};
pub use services::ReportService;
pub use store::{FileStore, MemoryStore, ReportStore};
