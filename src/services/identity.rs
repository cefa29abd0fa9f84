use crate::{
    config::auth::AuthConfig,
    error::{AppError, AppResult},
    models::{user, AuthProvider, RoleProfile, User, UserModel},
    utils::{hash_password_blocking, verify_password_blocking},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, SqlErr,
};

/// Fields written by profile completion.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role_profile: RoleProfile,
    /// `None` keeps whatever picture is already stored.
    pub profile_picture_url: Option<String>,
}

pub struct IdentityService {
    db: DatabaseConnection,
    config: AuthConfig,
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl IdentityService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            config: AuthConfig::from_env(),
        }
    }

    pub fn with_config(db: DatabaseConnection, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Create a local account. Returns the new user id.
    pub async fn register(&self, email: &str, password: &str) -> AppResult<i32> {
        if self.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password_blocking(password, self.config.bcrypt_cost).await?;
        let now = chrono::Utc::now().naive_utc();

        let new_user = user::ActiveModel {
            email: sea_orm::ActiveValue::Set(email.to_string()),
            password_hash: sea_orm::ActiveValue::Set(Some(password_hash)),
            auth_provider: sea_orm::ActiveValue::Set(AuthProvider::Local.as_str().to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        // The pre-check races with concurrent registrations; the unique index decides.
        match new_user.insert(&self.db).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "registered local account");
                Ok(user.id)
            }
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::Conflict("Email already registered".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check an email/password pair. Unknown emails, federation-only accounts
    /// and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate_local(&self, email: &str, password: &str) -> AppResult<UserModel> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password_blocking(password, hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn find_or_create_federated(&self, email: &str) -> AppResult<UserModel> {
        if let Some(existing) = self.find_by_email(email).await? {
            return Ok(existing);
        }

        let now = chrono::Utc::now().naive_utc();
        let new_user = user::ActiveModel {
            email: sea_orm::ActiveValue::Set(email.to_string()),
            password_hash: sea_orm::ActiveValue::Set(None),
            auth_provider: sea_orm::ActiveValue::Set(
                AuthProvider::Federated.as_str().to_string(),
            ),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        match new_user.insert(&self.db).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "created federated account");
                Ok(user)
            }
            // Lost a first-login race: the other request's row is the account.
            Err(e) if is_unique_violation(&e) => self.get_by_email(email).await,
            Err(e) => Err(e.into()),
        }
    }

    pub async fn complete_profile(
        &self,
        email: &str,
        update: ProfileUpdate,
    ) -> AppResult<UserModel> {
        let existing = self.get_by_email(email).await?;
        let role = update.role_profile.role();
        let (department, location, admin_code) = update.role_profile.admin_columns();

        let mut active: user::ActiveModel = existing.into();
        active.full_name = sea_orm::ActiveValue::Set(update.full_name);
        active.phone = sea_orm::ActiveValue::Set(update.phone);
        active.role = sea_orm::ActiveValue::Set(Some(role.as_str().to_string()));
        active.department = sea_orm::ActiveValue::Set(department);
        active.location = sea_orm::ActiveValue::Set(location);
        active.admin_code = sea_orm::ActiveValue::Set(admin_code);
        if let Some(url) = update.profile_picture_url {
            active.profile_picture_url = sea_orm::ActiveValue::Set(Some(url));
        }

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<UserModel> {
        self.find_by_email(email).await?.ok_or(AppError::NotFound)
    }

    /// Newest accounts first.
    pub async fn list_users(&self, page: u64, per_page: u64) -> AppResult<(Vec<UserModel>, u64)> {
        let paginator = User::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((users, total))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserModel>> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(user)
    }
}
