//! Teacher names (`professores`)

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{CreateProfessorCommand, CreateProfessorError, CreateProfessorResponse};
pub use queries::{ListProfessoresError, ListProfessoresResponse};
pub use routes::professores_routes;
