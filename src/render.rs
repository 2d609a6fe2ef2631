//! Plain-text rendering of the role views.

use std::fmt::Write as _;

use chrono::Local;

use crate::models::{Report, ReportStatus};
use crate::projection::{Role, StatusSummary};
use crate::utils::image::describe_data_uri;

pub const NO_REPORTS: &str = "No reports yet.";
pub const NO_TASKS: &str = "No assigned tasks (In Progress).";

pub fn render_view(role: Role, reports: &[&Report]) -> String {
    match role {
        Role::Citizen => render_citizen(reports),
        Role::Admin => render_admin(reports),
        Role::Agent => render_agent(reports),
    }
}

pub fn render_admin(reports: &[&Report]) -> String {
    if reports.is_empty() {
        return format!("{}\n", NO_REPORTS);
    }
    let mut out = String::new();
    for r in reports {
        let _ = writeln!(out, "[{}] {}", r.id, r.description);
        let _ = writeln!(out, "  {} • {} • {}", r.category, r.urgency, local_time(r));
        let _ = writeln!(out, "  status: {}", status_badge(r.status));
        let _ = writeln!(out, "  {}", r.location.as_deref().unwrap_or("Location not provided"));
        match &r.agent {
            Some(agent) => {
                let _ = writeln!(out, "  Assigned: {}", agent);
            }
            None => {
                let _ = writeln!(out, "  Unassigned");
            }
        }
        if let Some(image) = &r.image {
            let _ = writeln!(out, "  photo: {}", photo_label(image));
        }
        out.push('\n');
    }
    out
}

pub fn render_agent(reports: &[&Report]) -> String {
    if reports.is_empty() {
        return format!("{}\n", NO_TASKS);
    }
    let mut out = String::new();
    for r in reports {
        let _ = writeln!(out, "[{}] {}", r.id, r.description);
        let _ = writeln!(
            out,
            "  {} • Assigned to: {}",
            r.category,
            r.agent.as_deref().unwrap_or("Unassigned")
        );
        if let Some(image) = &r.image {
            let _ = writeln!(out, "  photo: {}", photo_label(image));
        }
        out.push('\n');
    }
    out
}

pub fn render_citizen(reports: &[&Report]) -> String {
    if reports.is_empty() {
        return format!("{}\n", NO_REPORTS);
    }
    let mut out = String::new();
    for r in reports {
        let _ = writeln!(out, "[{}] {}", r.id, r.description);
        let _ = writeln!(out, "  {} • {}", r.category, local_time(r));
        let _ = writeln!(out, "  status: {}", status_badge(r.status));
        if r.has_proof() {
            let before = r.before_photo.as_deref().map(photo_label);
            let after = r.after_photo.as_deref().map(photo_label);
            let _ = writeln!(
                out,
                "  proof: before {} / after {}",
                before.as_deref().unwrap_or("-"),
                after.as_deref().unwrap_or("-")
            );
        }
        out.push('\n');
    }
    out
}

pub fn render_details(r: &Report) -> String {
    format!(
        "Report: {}\nCategory: {}\nUrgency: {}\nLocation: {}\nStatus: {}\nAssigned: {}\n",
        r.description,
        r.category,
        r.urgency,
        r.location.as_deref().unwrap_or("N/A"),
        r.status,
        r.agent.as_deref().unwrap_or("N/A"),
    )
}

pub fn render_summary(summary: &StatusSummary) -> String {
    format!(
        "Total: {}\nReceived: {}\nIn Progress: {}\nResolved: {}\n",
        summary.total, summary.received, summary.in_progress, summary.resolved
    )
}

/// Short label for a stored photo; the payload itself is never printed.
pub fn photo_label(uri: &str) -> String {
    match describe_data_uri(uri) {
        Some((mime, size)) => format!("[image {}, {} bytes]", mime, size),
        None => "[image]".to_string(),
    }
}

fn status_badge(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Received => "(received) Received",
        ReportStatus::InProgress => "(inprogress) In Progress",
        ReportStatus::Resolved => "(resolved) Resolved",
    }
}

fn local_time(r: &Report) -> String {
    r.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
