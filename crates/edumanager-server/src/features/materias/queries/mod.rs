pub mod alerts;
pub mod list;

pub use alerts::{ListMateriaAlertsQuery, ListMateriaAlertsResponse};
pub use list::{ListMateriasError, ListMateriasQuery, ListMateriasResponse};
