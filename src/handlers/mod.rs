pub mod admin;
pub mod auth;
pub mod contact;
pub mod form;
pub mod profile;
pub mod report;
pub mod suggestion;

pub use auth::*;
