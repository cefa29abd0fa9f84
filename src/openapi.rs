use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health_check,
        // Auth routes
        crate::handlers::register,
        crate::handlers::login,
        crate::handlers::google_login,
        crate::handlers::logout,
        crate::handlers::get_current_user,
        // Profile
        crate::handlers::profile::complete_profile,
        // Report routes
        crate::handlers::report::report_issue,
        crate::handlers::report::my_reports,
        crate::handlers::report::delete_report,
        crate::handlers::report::categories,
        crate::handlers::suggestion::suggestion,
        // Admin routes
        crate::handlers::admin::list_reports,
        crate::handlers::admin::update_report_status,
        crate::handlers::admin::list_users,
        // Contact
        crate::handlers::contact::contact,
    ),
    components(
        schemas(
            crate::response::ApiResponse<serde_json::Value>,
            crate::response::PaginatedResponse<serde_json::Value>,
            crate::error::ErrorResponse,
            // Auth
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::RegisterResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::GoogleLoginRequest,
            crate::handlers::auth::TokenResponse,
            crate::handlers::auth::UserResponse,
            // Profile
            crate::handlers::profile::CompleteProfileForm,
            // Report
            crate::handlers::report::ReportResponse,
            crate::handlers::report::ReportIssueForm,
            crate::services::department::CategoryRoute,
            crate::services::suggestion::SuggestionContext,
            crate::handlers::suggestion::SuggestionResponse,
            // Admin
            crate::handlers::admin::ReportListQuery,
            crate::handlers::admin::UpdateStatusRequest,
            crate::handlers::admin::StatusUpdateResponse,
            crate::handlers::admin::AdminUserResponse,
            // Contact
            crate::handlers::contact::ContactRequest,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Registration and sign-in"),
        (name = "users", description = "User profile operations"),
        (name = "reports", description = "Citizen issue reports"),
        (name = "admin", description = "Department administration"),
        (name = "contact", description = "Contact form"),
    )
)]
pub struct ApiDoc;
