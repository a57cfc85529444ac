pub mod credentials;
pub mod sessions;
pub mod token;

pub use credentials::CredentialStore;
