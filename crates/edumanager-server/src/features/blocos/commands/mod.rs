pub mod create;

pub use create::{CreateBlocoCommand, CreateBlocoError, CreateBlocoOutcome, CreateBlocoResponse};
