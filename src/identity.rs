//! Acting-user identity management.
//!
//! Each identity field resolves independently:
//! 1) CLI flag (explicit)
//! 2) `MYTASKS_USER_ID` / `MYTASKS_USER_NAME` / `MYTASKS_USER_EMAIL`
//! 3) Persisted value in `.mytasks/identity.toml`
//! 4) Config `[identity]` section

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{Config, STATE_DIR};
use crate::error::{Error, Result};

const IDENTITY_FILENAME: &str = "identity.toml";

/// The user whose tasks are being matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// True when id, name and email are all blank. Such an identity matches
    /// nothing.
    pub fn is_empty(&self) -> bool {
        self.id.trim().is_empty() && self.name.trim().is_empty() && self.email.trim().is_empty()
    }

    /// Reject an empty identity at a caller boundary.
    pub fn require(self) -> Result<Self> {
        if self.is_empty() {
            Err(Error::IdentityMissing)
        } else {
            Ok(self)
        }
    }

    /// Short label for human output.
    pub fn label(&self) -> String {
        [&self.name, &self.email, &self.id]
            .into_iter()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .unwrap_or("unknown")
            .to_string()
    }
}

/// Identity fields supplied explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityOverrides<'a> {
    pub id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// Resolve the acting identity from overrides, environment, persisted value
/// and config, field by field.
pub fn resolve_identity(
    root: &Path,
    config: &Config,
    overrides: IdentityOverrides<'_>,
) -> Result<Identity> {
    let persisted = load_persisted_identity(root)?.unwrap_or_default();

    let pick = |cli: Option<&str>, env_key: &str, stored: &str, configured: &str| {
        let env_value = std::env::var(env_key).ok();
        non_empty(cli)
            .or_else(|| non_empty(env_value.as_deref()))
            .or_else(|| non_empty(Some(stored)))
            .or_else(|| non_empty(Some(configured)))
            .unwrap_or_default()
            .to_string()
    };

    Ok(Identity {
        id: pick(
            overrides.id,
            "MYTASKS_USER_ID",
            &persisted.id,
            &config.identity.id,
        ),
        name: pick(
            overrides.name,
            "MYTASKS_USER_NAME",
            &persisted.name,
            &config.identity.name,
        ),
        email: pick(
            overrides.email,
            "MYTASKS_USER_EMAIL",
            &persisted.email,
            &config.identity.email,
        ),
    })
}

/// Persist the identity in `.mytasks/identity.toml`.
pub fn persist_identity(root: &Path, identity: &Identity) -> Result<PathBuf> {
    if identity.is_empty() {
        return Err(Error::InvalidArgument(
            "identity needs at least one of id, name or email".to_string(),
        ));
    }

    let state_dir = root.join(STATE_DIR);
    std::fs::create_dir_all(&state_dir)?;
    let path = identity_path(root);
    let trimmed = Identity {
        id: identity.id.trim().to_string(),
        name: identity.name.trim().to_string(),
        email: identity.email.trim().to_string(),
    };
    std::fs::write(&path, toml::to_string_pretty(&trimmed)?)?;
    Ok(path)
}

/// Load the identity from `.mytasks/identity.toml`, if present.
pub fn load_persisted_identity(root: &Path) -> Result<Option<Identity>> {
    let path = identity_path(root);
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)?;
    let identity: Identity = toml::from_str(&raw)?;
    if identity.is_empty() {
        return Ok(None);
    }

    Ok(Some(identity))
}

pub fn identity_path(root: &Path) -> PathBuf {
    root.join(STATE_DIR).join(IDENTITY_FILENAME)
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
