//! Curriculum records (`controle_materia`)
//!
//! Pure logic lives beside the slice: `status` derives effective status from
//! block chains, `alerts` flags upcoming deadlines, `diff` plans minimal
//! updates and `import` checks spreadsheet rows. Commands and queries run it
//! against the database.

pub mod alerts;
pub mod commands;
pub mod diff;
pub mod import;
pub mod queries;
pub mod routes;
pub mod status;
pub mod types;

pub use commands::{
    AssignGroupCommand, AssignGroupError, CreateMateriaCommand, CreateMateriaError,
    DeleteMateriaCommand, DeleteMateriaError, DeleteMateriasCommand, DeleteMateriasError,
    ImportMateriasCommand, ImportMateriasError, ReconcileMateriasCommand, ReconcileMateriasError,
    UpdateStatusCommand, UpdateStatusError,
};
pub use queries::{ListMateriaAlertsQuery, ListMateriasError, ListMateriasQuery};
pub use routes::materias_routes;
pub use types::{Materia, MateriaField};
