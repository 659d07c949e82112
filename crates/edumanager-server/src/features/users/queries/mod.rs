pub mod authenticate;

pub use authenticate::{AuthenticateError, AuthenticateQuery, AuthenticateResponse};
