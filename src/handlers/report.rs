use crate::error::{AppError, AppResult, ErrorResponse};
use crate::handlers::form::read_form;
use crate::middleware::auth::{load_current_user, parse_report_id};
use crate::middleware::AuthUser;
use crate::models::ReportModel;
use crate::response::ApiResponse;
use crate::services::department::{all_routes, department_for, CategoryRoute};
use crate::services::lifecycle::ReportLifecycle;
use crate::services::report::NewReport;
use crate::services::upload::{prepare_image, ImageStorage, REPORTS_FOLDER};
use axum::{
    extract::{Multipart, Path},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    pub id: i32,
    pub image_url: String,
    pub location: String,
    pub description: String,
    /// Category of the issue
    pub tags: String,
    pub status: String,
    pub reported_at: String,
    /// Email of the reporter
    pub user_id: String,
    /// Department responsible for the category, if any
    pub department: Option<String>,
}

impl From<ReportModel> for ReportResponse {
    fn from(r: ReportModel) -> Self {
        let department = department_for(&r.tags).map(str::to_string);
        Self {
            id: r.id,
            image_url: r.image_url,
            location: r.location,
            description: r.description,
            tags: r.tags,
            status: r.status,
            reported_at: r.reported_at.to_string(),
            user_id: r.user_id,
            department,
        }
    }
}

/// Multipart body of `POST /report-issue`.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ReportIssueForm {
    #[schema(format = Binary, value_type = String)]
    pub image: Vec<u8>,
    pub location: String,
    pub description: String,
    /// One category from `GET /categories`
    pub tags: String,
}

#[utoipa::path(
    post,
    path = "/report-issue",
    security(("jwt_token" = [])),
    request_body(content = ReportIssueForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Report created", body = ReportResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 502, description = "Image upload failed", body = ErrorResponse),
    ),
    tag = "reports"
)]
pub async fn report_issue(
    Extension(db): Extension<DatabaseConnection>,
    Extension(storage): Extension<Arc<dyn ImageStorage>>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let reporter = load_current_user(&db, &auth_user).await?;

    let mut form = read_form(multipart, "image").await?;
    let location = form.required("location")?;
    let description = form.required("description")?;
    let tags = form.required("tags")?;
    let image = form
        .file
        .take()
        .ok_or_else(|| AppError::Validation("image is required".to_string()))?;

    // The report only exists once its photo is stored.
    let jpeg = prepare_image(image.data, &image.content_type).await?;
    let image_url = storage.upload(jpeg, REPORTS_FOLDER).await?;

    let report = ReportLifecycle::new(db)
        .submit(
            &reporter,
            NewReport {
                image_url,
                location,
                description,
                tags,
                owner_email: reporter.email.clone(),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            ReportResponse::from(report),
            "Issue reported successfully",
        ),
    ))
}

#[utoipa::path(
    get,
    path = "/my-reports",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Reports filed by the current user", body = Vec<ReportResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    tag = "reports"
)]
pub async fn my_reports(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user = load_current_user(&db, &auth_user).await?;
    let reports = ReportLifecycle::new(db).list_mine(&user).await?;
    let items: Vec<ReportResponse> = reports.into_iter().map(ReportResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    delete,
    path = "/reports/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report deleted"),
        (status = 400, description = "Malformed report id", body = ErrorResponse),
        (status = 404, description = "Report not found or not owned by caller", body = ErrorResponse),
    ),
    tag = "reports"
)]
pub async fn delete_report(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let report_id = parse_report_id(&id)?;
    let user = load_current_user(&db, &auth_user).await?;

    ReportLifecycle::new(db).withdraw(&user, report_id).await?;
    Ok(ApiResponse::message("Report deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "Issue categories and the department handling each", body = Vec<CategoryRoute>),
    ),
    tag = "reports"
)]
pub async fn categories() -> impl IntoResponse {
    ApiResponse::ok(all_routes())
}
