//! Role views over the report list. Pure functions, recomputed after every
//! mutation.

use crate::models::{Report, ReportStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Citizen,
    Admin,
    Agent,
}

/// Every report, in stored order.
pub fn admin_view(reports: &[Report]) -> Vec<&Report> {
    reports.iter().collect()
}

/// Reports currently In Progress, in stored order.
pub fn agent_view(reports: &[Report]) -> Vec<&Report> {
    reports
        .iter()
        .filter(|r| r.status == ReportStatus::InProgress)
        .collect()
}

/// Every report. No submitter identity is tracked, so citizens see all of them.
pub fn citizen_view(reports: &[Report]) -> Vec<&Report> {
    reports.iter().collect()
}

pub fn view_for(role: Role, reports: &[Report]) -> Vec<&Report> {
    match role {
        Role::Citizen => citizen_view(reports),
        Role::Admin => admin_view(reports),
        Role::Agent => agent_view(reports),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub total: usize,
    pub received: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

pub fn summary(reports: &[Report]) -> StatusSummary {
    reports.iter().fold(StatusSummary::default(), |mut acc, r| {
        acc.total += 1;
        match r.status {
            ReportStatus::Received => acc.received += 1,
            ReportStatus::InProgress => acc.in_progress += 1,
            ReportStatus::Resolved => acc.resolved += 1,
        }
        acc
    })
}

/// All three views of one snapshot.
#[derive(Debug)]
pub struct Dashboard<'a> {
    pub citizen: Vec<&'a Report>,
    pub admin: Vec<&'a Report>,
    pub agent: Vec<&'a Report>,
    pub summary: StatusSummary,
}

impl<'a> Dashboard<'a> {
    pub fn from_reports(reports: &'a [Report]) -> Self {
        Self {
            citizen: citizen_view(reports),
            admin: admin_view(reports),
            agent: agent_view(reports),
            summary: summary(reports),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(id: &str, status: ReportStatus) -> Report {
        Report {
            id: id.to_string(),
            description: id.to_string(),
            category: String::new(),
            urgency: String::new(),
            location: None,
            image: None,
            status,
            agent: (status != ReportStatus::Received).then(|| "Agent-10".to_string()),
            before_photo: None,
            after_photo: None,
            created_at: Utc::now(),
        }
    }

    fn ids(view: &[&Report]) -> Vec<String> {
        view.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_views_keep_order() {
        let reports = vec![
            report("d", ReportStatus::InProgress),
            report("c", ReportStatus::Resolved),
            report("b", ReportStatus::InProgress),
            report("a", ReportStatus::Received),
        ];
        assert_eq!(ids(&admin_view(&reports)), ["d", "c", "b", "a"]);
        assert_eq!(ids(&citizen_view(&reports)), ["d", "c", "b", "a"]);
        assert_eq!(ids(&agent_view(&reports)), ["d", "b"]);
        assert_eq!(ids(&view_for(Role::Agent, &reports)), ["d", "b"]);
    }

    #[test]
    fn test_empty_views() {
        let dashboard = Dashboard::from_reports(&[]);
        assert!(dashboard.citizen.is_empty());
        assert!(dashboard.admin.is_empty());
        assert!(dashboard.agent.is_empty());
        assert_eq!(dashboard.summary, StatusSummary::default());
    }

    #[test]
    fn test_summary_counts() {
        let reports = vec![
            report("a", ReportStatus::Received),
            report("b", ReportStatus::Received),
            report("c", ReportStatus::InProgress),
            report("d", ReportStatus::Resolved),
        ];
        assert_eq!(
            summary(&reports),
            StatusSummary {
                total: 4,
                received: 2,
                in_progress: 1,
                resolved: 1,
            }
        );
    }
}
