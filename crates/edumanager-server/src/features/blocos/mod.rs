//! Block deadlines (`bloco`) shared by a group of records

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use commands::{CreateBlocoCommand, CreateBlocoError, CreateBlocoOutcome, CreateBlocoResponse};
pub use queries::{ListBlocosError, ListBlocosQuery, ListBlocosResponse};
pub use routes::blocos_routes;
pub use types::Bloco;
