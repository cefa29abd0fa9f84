use crate::error::{AppResult, ErrorResponse};
use crate::handlers::report::ReportResponse;
use crate::middleware::auth::{parse_report_id, require_admin, AuthUser};
use crate::models::UserModel;
use crate::response::{ApiResponse, Page, PaginatedResponse};
use crate::services::identity::IdentityService;
use crate::services::lifecycle::ReportLifecycle;
use crate::services::report::{ReportFilter, StatusUpdate};
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ReportListQuery {
    /// Case-insensitive match on category or location
    pub search: Option<String>,
    /// Exact, case-sensitive status; `all` (lowercase) disables the filter
    pub status: Option<String>,
    /// Case-insensitive match on category
    pub tag: Option<String>,
    /// Day the report was filed, `YYYY-MM-DD`
    pub date: Option<String>,
    pub page: Option<u64>,
    /// Page size (default 20, max 100)
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Free-form status label of at most 50 characters, e.g. `In Progress`
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusUpdateResponse {
    pub report: ReportResponse,
    /// False when the report already had this status
    pub changed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: i32,
    pub email: String,
    pub auth_provider: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub created_at: String,
}

impl From<UserModel> for AdminUserResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            email: u.email,
            auth_provider: u.auth_provider,
            full_name: u.full_name,
            role: u.role,
            department: u.department,
            created_at: u.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/reports",
    security(("jwt_token" = [])),
    params(ReportListQuery),
    responses(
        (status = 200, description = "Filtered reports, newest first", body = PaginatedResponse<ReportResponse>),
        (status = 400, description = "Malformed filter", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn list_reports(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<ReportListQuery>,
) -> AppResult<impl IntoResponse> {
    let admin = require_admin(&db, &auth_user).await?;

    let page = Page::from_query(params.page, params.limit);
    let filter = ReportFilter {
        search: params.search,
        status: params.status,
        tag: params.tag,
        date: params.date,
    };

    let (reports, total) = ReportLifecycle::new(db)
        .list_all(&admin, &filter, page)
        .await?;
    let items = reports.into_iter().map(ReportResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page.page, page.limit,
    )))
}

#[utoipa::path(
    put,
    path = "/admin/reports/{id}/status",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated (or already set)", body = StatusUpdateResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Not an admin, or wrong department", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 422, description = "Category has no responsible department", body = ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn update_report_status(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let report_id = parse_report_id(&id)?;
    let admin = require_admin(&db, &auth_user).await?;

    let (report, outcome) = ReportLifecycle::new(db)
        .update_status(&admin, report_id, &payload.status)
        .await?;

    let changed = outcome == StatusUpdate::Updated;
    let message = if changed {
        "Status updated successfully"
    } else {
        "Status unchanged"
    };

    Ok(ApiResponse::with_message(
        StatusUpdateResponse {
            report: ReportResponse::from(report),
            changed,
        },
        message,
    ))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    security(("jwt_token" = [])),
    params(UserListQuery),
    responses(
        (status = 200, description = "List of users", body = PaginatedResponse<AdminUserResponse>),
        (status = 403, description = "Admin only", body = ErrorResponse),
    ),
    tag = "admin"
)]
pub async fn list_users(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<UserListQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let page = Page::from_query(params.page, params.limit);
    let (users, total) = IdentityService::new(db)
        .list_users(page.page, page.limit)
        .await?;
    let items = users.into_iter().map(AdminUserResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page.page, page.limit,
    )))
}
