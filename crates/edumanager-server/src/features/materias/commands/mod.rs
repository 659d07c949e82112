pub mod assign_group;
pub mod create;
pub mod delete;
pub mod import;
pub mod reconcile;
pub mod update_status;

pub use assign_group::{AssignGroupCommand, AssignGroupError, AssignGroupResponse};
pub use create::{CreateMateriaCommand, CreateMateriaError, CreateMateriaResponse};
pub use delete::{
    DeleteMateriaCommand, DeleteMateriaError, DeleteMateriaResponse, DeleteMateriasCommand,
    DeleteMateriasError, DeleteMateriasResponse,
};
pub use import::{ImportMateriasCommand, ImportMateriasError, ImportMateriasResponse};
pub use reconcile::{ReconcileMateriasCommand, ReconcileMateriasError, ReconcileMateriasResponse};
pub use update_status::{UpdateStatusCommand, UpdateStatusError, UpdateStatusResponse};
