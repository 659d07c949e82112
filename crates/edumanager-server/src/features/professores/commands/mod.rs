pub mod create;

pub use create::{CreateProfessorCommand, CreateProfessorError, CreateProfessorResponse};
