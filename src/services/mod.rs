pub mod report_service;

pub use report_service::{placeholder_agent_name, ReportService};
