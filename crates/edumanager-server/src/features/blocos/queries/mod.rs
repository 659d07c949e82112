pub mod list;

pub use list::{ListBlocosError, ListBlocosQuery, ListBlocosResponse};
