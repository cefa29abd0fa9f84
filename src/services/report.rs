use crate::{
    error::{AppError, AppResult},
    models::{report, Report, ReportModel},
    response::Page,
};
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

#[derive(Debug, Clone)]
pub struct NewReport {
    pub image_url: String,
    pub location: String,
    pub description: String,
    pub tags: String,
    pub owner_email: String,
}

/// Admin listing filters. Every present field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Substring of either the category or the location.
    pub search: Option<String>,
    /// Exact status; the literal `all` or empty disables the filter.
    pub status: Option<String>,
    /// Substring of the category.
    pub tag: Option<String>,
    /// `YYYY-MM-DD`, matched against the calendar day of `reported_at`.
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    Updated,
    Unchanged,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `%needle%` with LIKE wildcards in the needle escaped by `\`.
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn ilike(column: report::Column, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(contains_pattern(needle)).escape('\\'))
}

fn day_bounds(raw: &str) -> AppResult<(NaiveDateTime, NaiveDateTime)> {
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("date must be formatted as YYYY-MM-DD".to_string()))?;
    let start = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    let end = day
        .succ_opt()
        .and_then(|next| next.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AppError::Validation("date out of range".to_string()))?;
    Ok((start, end))
}

impl ReportFilter {
    fn condition(&self) -> AppResult<Condition> {
        let mut cond = Condition::all();

        if let Some(search) = non_blank(&self.search) {
            cond = cond.add(
                Condition::any()
                    .add(ilike(report::Column::Tags, search))
                    .add(ilike(report::Column::Location, search)),
            );
        }

        if let Some(status) = non_blank(&self.status) {
            if status != "all" {
                cond = cond.add(report::Column::Status.eq(status));
            }
        }

        if let Some(tag) = non_blank(&self.tag) {
            cond = cond.add(ilike(report::Column::Tags, tag));
        }

        if let Some(date) = non_blank(&self.date) {
            let (start, end) = day_bounds(date)?;
            cond = cond
                .add(report::Column::ReportedAt.gte(start))
                .add(report::Column::ReportedAt.lt(end));
        }

        Ok(cond)
    }
}

pub struct ReportService {
    db: DatabaseConnection,
}

impl ReportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewReport) -> AppResult<ReportModel> {
        let now = chrono::Utc::now().naive_utc();
        let model = report::ActiveModel {
            image_url: sea_orm::ActiveValue::Set(new.image_url),
            location: sea_orm::ActiveValue::Set(new.location),
            description: sea_orm::ActiveValue::Set(new.description),
            tags: sea_orm::ActiveValue::Set(new.tags),
            status: sea_orm::ActiveValue::Set(report::INITIAL_STATUS.to_string()),
            reported_at: sea_orm::ActiveValue::Set(now),
            user_id: sea_orm::ActiveValue::Set(new.owner_email),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        Ok(saved)
    }

    pub async fn find(&self, report_id: i32) -> AppResult<ReportModel> {
        Report::find_by_id(report_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn list_by_owner(&self, owner_email: &str) -> AppResult<Vec<ReportModel>> {
        let reports = Report::find()
            .filter(report::Column::UserId.eq(owner_email))
            .order_by_desc(report::Column::ReportedAt)
            .order_by_desc(report::Column::Id)
            .all(&self.db)
            .await?;
        Ok(reports)
    }

    /// Ownership is part of the predicate, so a foreign report and a missing
    /// one produce the same error.
    pub async fn delete(&self, report_id: i32, owner_email: &str) -> AppResult<()> {
        let result = Report::delete_many()
            .filter(report::Column::Id.eq(report_id))
            .filter(report::Column::UserId.eq(owner_email))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFoundOrUnauthorized);
        }
        Ok(())
    }

    pub async fn list_filtered(
        &self,
        filter: &ReportFilter,
        page: Page,
    ) -> AppResult<(Vec<ReportModel>, u64)> {
        let paginator = Report::find()
            .filter(filter.condition()?)
            .order_by_desc(report::Column::ReportedAt)
            .order_by_desc(report::Column::Id)
            .paginate(&self.db, page.limit);

        let total = paginator.num_items().await?;
        let reports = paginator.fetch_page(page.page - 1).await?;
        Ok((reports, total))
    }

    pub async fn update_status(&self, report_id: i32, new_status: &str) -> AppResult<StatusUpdate> {
        let result = Report::update_many()
            .col_expr(report::Column::Status, Expr::value(new_status))
            .filter(report::Column::Id.eq(report_id))
            .filter(report::Column::Status.ne(new_status))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            return Ok(StatusUpdate::Updated);
        }

        // Nothing changed: either the status was already set or the row is gone.
        self.find(report_id).await?;
        Ok(StatusUpdate::Unchanged)
    }
}
