pub mod cloudinary;
pub mod credentials;
pub mod department;
pub mod email;
pub mod federated;
pub mod identity;
pub mod lifecycle;
pub mod report;
pub mod suggestion;
pub mod upload;
