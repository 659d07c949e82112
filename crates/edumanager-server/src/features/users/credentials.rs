//! Password storage schemes
//!
//! Accounts created before hashing was introduced hold their password as
//! plain text, so the scheme is chosen by configuration (`EDU_CREDENTIAL_SCHEME`).
//! `sha256` stores `sha256$<salt>$<hex digest>`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SHA256_PREFIX: &str = "sha256";

/// Hashes new passwords and checks submitted ones against stored values
pub trait CredentialVerifier: Send + Sync + fmt::Debug {
    fn scheme(&self) -> CredentialScheme;

    /// Value to store in `users.password`
    fn hash(&self, password: &str) -> String;

    fn verify(&self, password: &str, stored: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialScheme {
    Plain,
    Sha256,
}

impl CredentialScheme {
    pub fn verifier(self) -> Arc<dyn CredentialVerifier> {
        match self {
            CredentialScheme::Plain => Arc::new(PlainTextCredentials),
            CredentialScheme::Sha256 => Arc::new(Sha256Credentials),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CredentialScheme::Plain => "plain",
            CredentialScheme::Sha256 => "sha256",
        }
    }
}

impl FromStr for CredentialScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(CredentialScheme::Plain),
            "sha256" => Ok(CredentialScheme::Sha256),
            other => Err(format!("unknown credential scheme '{other}'")),
        }
    }
}

impl fmt::Display for CredentialScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored value equals the password
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextCredentials;

impl CredentialVerifier for PlainTextCredentials {
    fn scheme(&self) -> CredentialScheme {
        CredentialScheme::Plain
    }

    fn hash(&self, password: &str) -> String {
        password.to_string()
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        constant_time_eq(password.as_bytes(), stored.as_bytes())
    }
}

/// Salted SHA-256
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Credentials;

impl Sha256Credentials {
    fn digest(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl CredentialVerifier for Sha256Credentials {
    fn scheme(&self) -> CredentialScheme {
        CredentialScheme::Sha256
    }

    fn hash(&self, password: &str) -> String {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let digest = Self::digest(&salt, password);
        format!("{SHA256_PREFIX}${salt}${digest}")
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let mut parts = stored.splitn(3, '$');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(SHA256_PREFIX), Some(salt), Some(expected)) => {
                let actual = Self::digest(salt, password);
                constant_time_eq(actual.as_bytes(), expected.as_bytes())
            },
            _ => false,
        }
    }
}

/// Length mismatches return early; equal-length inputs compare in constant time
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
