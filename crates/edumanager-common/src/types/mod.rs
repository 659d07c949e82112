//! Common types used across EduManager

use serde::{Deserialize, Serialize};

use crate::error::EduError;

// ============================================================================
// Workflow Status
// ============================================================================

/// Production stage of a curriculum record.
///
/// Labels are the ones users see and the ones stored in the `status` column.
/// [`MateriaStatus::AwaitingPedagogicalReview`] is only ever produced at read
/// time and is never written back as a stored value by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MateriaStatus {
    #[serde(rename = "Não iniciado")]
    NotStarted,
    #[serde(rename = "Em andamento")]
    InProgress,
    #[serde(rename = "Concluído")]
    Done,
    #[serde(rename = "Aguardando revisão pedagógica")]
    AwaitingPedagogicalReview,
}

impl MateriaStatus {
    /// Every label, in workflow order
    pub const ALL: [MateriaStatus; 4] = [
        MateriaStatus::NotStarted,
        MateriaStatus::InProgress,
        MateriaStatus::Done,
        MateriaStatus::AwaitingPedagogicalReview,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MateriaStatus::NotStarted => "Não iniciado",
            MateriaStatus::InProgress => "Em andamento",
            MateriaStatus::Done => "Concluído",
            MateriaStatus::AwaitingPedagogicalReview => "Aguardando revisão pedagógica",
        }
    }

    /// Textual "done" check used by the alert rule
    pub fn is_done(self) -> bool {
        self == MateriaStatus::Done
    }

    /// Whether a caller may store this label directly
    pub fn is_storable(self) -> bool {
        self != MateriaStatus::AwaitingPedagogicalReview
    }
}

impl std::str::FromStr for MateriaStatus {
    type Err = EduError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        MateriaStatus::ALL
            .into_iter()
            .find(|status| status.label() == trimmed)
            .ok_or_else(|| EduError::UnknownStatus(s.to_string()))
    }
}

impl std::fmt::Display for MateriaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Account Roles
// ============================================================================

/// Role attached to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Reader,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "super_admin",
            UserRole::Admin => "admin",
            UserRole::Reader => "reader",
        }
    }

    /// Full CRUD plus user and teacher management
    pub fn is_privileged(self) -> bool {
        matches!(self, UserRole::SuperAdmin | UserRole::Admin)
    }

    /// Whether an account with this role may register an account with `target`
    pub fn can_grant(self, target: UserRole) -> bool {
        match self {
            UserRole::SuperAdmin => true,
            UserRole::Admin => target != UserRole::SuperAdmin,
            UserRole::Reader => false,
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = EduError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "super_admin" => Ok(UserRole::SuperAdmin),
            "admin" => Ok(UserRole::Admin),
            "reader" => Ok(UserRole::Reader),
            other => Err(EduError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
