//! Who may do what to a report.
//!
//! Ownership governs withdrawal, the admin role governs listing, and the
//! department routing table narrows status changes to the admins whose
//! department handles the report's category.

use crate::{
    error::{AppError, AppResult},
    models::{ReportModel, UserModel},
    response::Page,
    services::{
        department::department_for,
        report::{NewReport, ReportFilter, ReportService, StatusUpdate},
    },
};
use sea_orm::DatabaseConnection;

pub const MAX_STATUS_LEN: usize = 50;

pub struct ReportLifecycle {
    reports: ReportService,
}

fn validate_status(status: &str) -> AppResult<&str> {
    let status = status.trim();
    if status.is_empty() {
        return Err(AppError::Validation("status must not be empty".to_string()));
    }
    if status.chars().count() > MAX_STATUS_LEN {
        return Err(AppError::Validation(format!(
            "status must be at most {MAX_STATUS_LEN} characters"
        )));
    }
    Ok(status)
}

impl ReportLifecycle {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            reports: ReportService::new(db),
        }
    }

    pub async fn submit(&self, reporter: &UserModel, new: NewReport) -> AppResult<ReportModel> {
        let report = self
            .reports
            .create(NewReport {
                owner_email: reporter.email.clone(),
                ..new
            })
            .await?;
        tracing::info!(report_id = report.id, tags = %report.tags, "report submitted");
        Ok(report)
    }

    pub async fn list_mine(&self, user: &UserModel) -> AppResult<Vec<ReportModel>> {
        self.reports.list_by_owner(&user.email).await
    }

    /// Owners only; admins get no override.
    pub async fn withdraw(&self, user: &UserModel, report_id: i32) -> AppResult<()> {
        self.reports.delete(report_id, &user.email).await?;
        tracing::info!(report_id, "report withdrawn by owner");
        Ok(())
    }

    pub async fn list_all(
        &self,
        admin: &UserModel,
        filter: &ReportFilter,
        page: Page,
    ) -> AppResult<(Vec<ReportModel>, u64)> {
        if !admin.is_admin() {
            return Err(AppError::Forbidden);
        }
        self.reports.list_filtered(filter, page).await
    }

    pub async fn update_status(
        &self,
        admin: &UserModel,
        report_id: i32,
        new_status: &str,
    ) -> AppResult<(ReportModel, StatusUpdate)> {
        if !admin.is_admin() {
            return Err(AppError::Forbidden);
        }

        let report = self.reports.find(report_id).await?;

        let responsible = department_for(&report.tags)
            .ok_or_else(|| AppError::CategoryUnmapped(report.tags.clone()))?;
        if admin.department.as_deref() != Some(responsible) {
            tracing::warn!(
                report_id,
                admin_department = admin.department.as_deref().unwrap_or("<none>"),
                responsible,
                "status update refused"
            );
            return Err(AppError::DepartmentMismatch);
        }

        let status = validate_status(new_status)?;
        let outcome = self.reports.update_status(report_id, status).await?;
        if outcome == StatusUpdate::Updated {
            tracing::info!(report_id, status, "report status changed");
        }

        let report = self.reports.find(report_id).await?;
        Ok((report, outcome))
    }
}
