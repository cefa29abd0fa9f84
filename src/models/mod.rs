pub mod report;
pub mod user;

pub use report::{Entity as Report, Model as ReportModel};
pub use user::{AuthProvider, Entity as User, Model as UserModel, Role, RoleProfile};
