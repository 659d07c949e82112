//! Accounts, credentials and request authentication

pub mod commands;
pub mod credentials;
pub mod queries;
pub mod routes;
pub mod session;

pub use commands::{CreateUserCommand, CreateUserError, CreateUserResponse};
pub use credentials::{CredentialScheme, CredentialVerifier};
pub use queries::{AuthenticateError, AuthenticateQuery, AuthenticateResponse};
pub use routes::{auth_routes, users_routes};
pub use session::{AuthError, SessionContext};
