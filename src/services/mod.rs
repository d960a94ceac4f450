pub mod auth_service;
pub mod auth_service_impl;
pub mod session;

pub use auth_service::{AuthError, CredentialService};
pub use auth_service_impl::FileCredentialService;
pub use session::SessionCodec;
