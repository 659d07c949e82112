pub mod list;

pub use list::{ListProfessoresError, ListProfessoresResponse};
