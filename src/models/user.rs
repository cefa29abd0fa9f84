use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    /// Absent for accounts that only ever signed in through the identity provider.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub auth_provider: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    #[serde(skip_serializing)]
    pub admin_code: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Local,
    Federated,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Local => "local",
            AuthProvider::Federated => "federated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Accepts the capitalised spelling the web client sends.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Role together with the fields that only exist for that role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleProfile {
    User,
    Admin {
        department: Option<String>,
        location: Option<String>,
        admin_code: Option<String>,
    },
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::User => Role::User,
            RoleProfile::Admin { .. } => Role::Admin,
        }
    }

    /// Flatten into the persisted `(department, location, admin_code)` columns.
    pub fn admin_columns(&self) -> (Option<String>, Option<String>, Option<String>) {
        match self {
            RoleProfile::User => (None, None, None),
            RoleProfile::Admin {
                department,
                location,
                admin_code,
            } => (department.clone(), location.clone(), admin_code.clone()),
        }
    }
}

impl Model {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::parse)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// A profile is complete once a role has been chosen.
    pub fn profile_complete(&self) -> bool {
        self.role().is_some()
    }

    pub fn role_profile(&self) -> Option<RoleProfile> {
        match self.role()? {
            Role::User => Some(RoleProfile::User),
            Role::Admin => Some(RoleProfile::Admin {
                department: self.department.clone(),
                location: self.location.clone(),
                admin_code: self.admin_code.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_user() -> Model {
        Model {
            id: 1,
            email: "alice@x.com".into(),
            password_hash: None,
            auth_provider: AuthProvider::Local.as_str().into(),
            full_name: None,
            phone: None,
            role: None,
            department: None,
            location: None,
            admin_code: None,
            profile_picture_url: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" user "), Some(Role::User));
        assert_eq!(Role::parse("moderator"), None);
    }

    #[test]
    fn user_profile_has_no_admin_columns() {
        assert_eq!(RoleProfile::User.admin_columns(), (None, None, None));
    }

    #[test]
    fn incomplete_profile_until_role_set() {
        let mut user = blank_user();
        assert!(!user.profile_complete());
        assert_eq!(user.role_profile(), None);

        user.role = Some("admin".into());
        user.department = Some("Sanitation Department".into());
        assert!(user.profile_complete());
        assert!(user.is_admin());
        assert_eq!(
            user.role_profile(),
            Some(RoleProfile::Admin {
                department: Some("Sanitation Department".into()),
                location: None,
                admin_code: None,
            })
        );
    }
}
