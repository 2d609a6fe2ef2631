use chrono::{SubsecRound, Utc};
use rand::Rng;

use crate::error::{ReportError, Result};
use crate::id::new_id;
use crate::models::{NewReport, Report, ReportStatus};
use crate::store::ReportStore;

/// Placeholder handler name, `Agent-10` through `Agent-99`.
pub fn placeholder_agent_name() -> String {
    format!("Agent-{}", rand::thread_rng().gen_range(10..=99))
}

/// Report lifecycle over an injected store.
///
/// Every mutation loads the full list, changes it and writes it back in one
/// `save`. A failed operation never writes.
pub struct ReportService<S: ReportStore> {
    store: S,
}

impl<S: ReportStore> ReportService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reports(&self) -> Vec<Report> {
        self.store.load()
    }

    pub fn find(&self, report_id: &str) -> Result<Report> {
        self.store
            .load()
            .into_iter()
            .find(|r| r.id == report_id)
            .ok_or_else(|| ReportError::not_found(report_id))
    }

    pub fn submit(&self, input: NewReport) -> Result<Report> {
        let description = input.description.trim();
        if description.is_empty() {
            return Err(ReportError::validation("Please enter a short description"));
        }

        let report = Report {
            id: new_id(),
            description: description.to_string(),
            category: input.category,
            urgency: input.urgency,
            location: input.location.filter(|l| !l.trim().is_empty()),
            image: input.image,
            status: ReportStatus::Received,
            agent: None,
            before_photo: None,
            after_photo: None,
            created_at: Utc::now().trunc_subsecs(3),
        };

        let mut reports = self.store.load();
        reports.insert(0, report.clone());
        self.store.save(&reports)?;

        tracing::info!("Report submitted: id={} category={} urgency={}", report.id, report.category, report.urgency);
        Ok(report)
    }

    /// Sets the handler and moves the report to In Progress, whatever its
    /// current status.
    pub fn assign(&self, report_id: &str, agent_name: &str) -> Result<Report> {
        let agent_name = agent_name.trim();
        if agent_name.is_empty() {
            return Err(ReportError::validation("Agent name cannot be empty"));
        }

        let report = self.update(report_id, |r| {
            r.agent = Some(agent_name.to_string());
            r.status = ReportStatus::InProgress;
        })?;

        tracing::info!("Report assigned: id={} agent={}", report.id, agent_name);
        Ok(report)
    }

    /// Attaches before/after proof and resolves the report. Prior status is
    /// not checked.
    pub fn verify(
        &self,
        report_id: &str,
        before_image: Option<String>,
        after_image: Option<String>,
    ) -> Result<Report> {
        let before = before_image.filter(|s| !s.is_empty());
        let after = after_image.filter(|s| !s.is_empty());
        let (before, after) = match (before, after) {
            (Some(b), Some(a)) => (b, a),
            _ => return Err(ReportError::validation("Select both before and after photos")),
        };

        let report = self.update(report_id, move |r| {
            r.before_photo = Some(before);
            r.after_photo = Some(after);
            r.status = ReportStatus::Resolved;
        })?;

        tracing::info!("Report resolved with proof: id={}", report.id);
        Ok(report)
    }

    /// Assigns a placeholder agent to every unassigned report. Returns the
    /// number changed; zero means nothing was written.
    pub fn auto_assign_all(&self) -> Result<usize> {
        let mut reports = self.store.load();
        let mut changed = 0;
        for report in reports.iter_mut().filter(|r| r.agent.is_none()) {
            report.agent = Some(placeholder_agent_name());
            report.status = ReportStatus::InProgress;
            changed += 1;
        }

        if changed == 0 {
            tracing::info!("No unassigned reports found");
            return Ok(0);
        }

        self.store.save(&reports)?;
        tracing::info!("Auto-assigned agents to {} reports", changed);
        Ok(changed)
    }

    /// Resolves every In Progress report, using the submitted photo as the
    /// after-photo when none was uploaded.
    pub fn auto_resolve_all(&self) -> Result<usize> {
        let mut reports = self.store.load();
        let mut changed = 0;
        for report in reports
            .iter_mut()
            .filter(|r| r.status == ReportStatus::InProgress)
        {
            report.status = ReportStatus::Resolved;
            if report.after_photo.is_none() {
                report.after_photo = report.image.clone();
            }
            changed += 1;
        }

        if changed == 0 {
            tracing::info!("No In Progress reports to resolve");
            return Ok(0);
        }

        self.store.save(&reports)?;
        tracing::info!("Auto-resolved {} reports", changed);
        Ok(changed)
    }

    /// Clears the whole collection. Callers obtain confirmation first.
    pub fn reset_all(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("All reports cleared");
        Ok(())
    }

    fn update<F>(&self, report_id: &str, apply: F) -> Result<Report>
    where
        F: FnOnce(&mut Report),
    {
        let mut reports = self.store.load();
        let report = reports
            .iter_mut()
            .find(|r| r.id == report_id)
            .ok_or_else(|| ReportError::not_found(report_id))?;
        apply(report);
        let updated = report.clone();
        self.store.save(&reports)?;
        Ok(updated)
    }
}
