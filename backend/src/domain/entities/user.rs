//! Operator accounts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, Stored, optional_text_field, take_text, text_field, unknown_field};
use crate::domain::field::{FieldKind, FieldSpec, FieldValue, IdSyntax};
use crate::domain::ports::{IndexKey, IndexName};
use crate::domain::{Doctype, DocumentMeta, EntityConfig, DomainError};

/// Key of the API token attribute, set only by token issuance.
pub const API_TOKEN: &str = "api_token";

/// Account lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Registered, awaiting approval.
    #[default]
    Pending,
    /// Approved by an administrator.
    Approved,
    /// Allowed to act.
    Active,
    /// Barred from acting.
    Blocked,
}

impl UserStatus {
    const OPTIONS: &'static [&'static str] = &["pending", "approved", "active", "blocked"];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "active" => Ok(Self::Active),
            "blocked" => Ok(Self::Blocked),
            other => Err(DomainError::invalid_field(
                "status",
                "invalid_choice",
                format!("unknown user status {other}"),
            )),
        }
    }
}

/// Account privilege level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Ordinary operator.
    #[default]
    User,
    /// Administrator.
    Admin,
}

impl UserRole {
    const OPTIONS: &'static [&'static str] = &["user", "admin"];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::invalid_field(
                "role",
                "invalid_choice",
                format!("unknown user role {other}"),
            )),
        }
    }
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "email",
        FieldKind::Identifier {
            index: IndexName::UserEmail,
            syntax: IdSyntax::Email,
        },
    )
    .mandatory()
    .immutable(),
    FieldSpec::text("name"),
    FieldSpec::new("role", FieldKind::Choice(UserRole::OPTIONS)).with_text_default("user"),
    FieldSpec::new("status", FieldKind::Choice(UserStatus::OPTIONS)).with_text_default("pending"),
];

/// An operator account, unique by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Document metadata.
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Login email, unique across accounts.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Privilege level.
    #[serde(default)]
    pub role: UserRole,
    /// Lifecycle state.
    #[serde(default)]
    pub status: UserStatus,
    /// Bearer token presented by automated clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl User {
    /// Unsaved account.
    #[must_use]
    pub fn draft(created: DateTime<Utc>) -> Self {
        Self {
            meta: DocumentMeta::fresh(Doctype::User, created),
            email: String::new(),
            name: None,
            role: UserRole::default(),
            status: UserStatus::default(),
            api_token: None,
        }
    }

    /// Whether the account may act as an operator.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

impl Stored for User {
    const DOCTYPE: Doctype = Doctype::User;

    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

impl Entity for User {
    fn field_specs(_config: &EntityConfig) -> &'static [FieldSpec] {
        FIELDS
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "email" => text_field(&self.email),
            "name" => optional_text_field(self.name.as_ref()),
            "role" => Some(FieldValue::Text(self.role.as_str().to_owned())),
            "status" => Some(FieldValue::Text(self.status.as_str().to_owned())),
            API_TOKEN => optional_text_field(self.api_token.as_ref()),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: Option<FieldValue>) -> Result<(), DomainError> {
        let text = take_text(Doctype::User, key, value)?;
        match key {
            "email" => self.email = text.unwrap_or_default(),
            "name" => self.name = text,
            "role" => self.role = text.as_deref().map(str::parse).transpose()?.unwrap_or_default(),
            "status" => {
                self.status = text.as_deref().map(str::parse).transpose()?.unwrap_or_default();
            }
            API_TOKEN => self.api_token = text,
            _ => return unknown_field(Doctype::User, key),
        }
        Ok(())
    }

    fn scope(&self) -> IndexKey {
        IndexKey::new(Vec::<String>::new())
    }
}
