//! User entity and related types

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::role::{Role, RoleSet};
use super::validation::{
    validate_nip, validate_user_id, UserValidationError, USER_ID_PREFIX, USER_ID_SUFFIX_LENGTH,
};
use crate::domain::auth::Identity;

/// User identifier of the form `USR-XXXXXX`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        let mut bytes = [0u8; USER_ID_SUFFIX_LENGTH / 2];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(format!("{}{}", USER_ID_PREFIX, hex::encode_upper(bytes)))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// User is active and can log in
    #[default]
    Active,
    /// User is temporarily suspended
    Suspended,
}

impl UserStatus {
    /// Check if the user can log in
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }

    /// Parse a stored label; anything unrecognised is treated as suspended
    pub fn from_label(label: &str) -> Self {
        match label {
            "active" => Self::Active,
            _ => Self::Suspended,
        }
    }
}

/// User entity held by the user store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    name: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    role: Role,
    /// Lecturer number, only kept for `dosen`
    #[serde(skip_serializing_if = "Option::is_none")]
    nip: Option<String>,
    /// Student number, only kept for `mahasiswa`
    #[serde(skip_serializing_if = "Option::is_none")]
    nim: Option<String>,
    status: UserStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new user.
    ///
    /// A `dosen` must carry a NIP. The NIP is dropped for every other role,
    /// and the NIM is dropped for every role except `mahasiswa`.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        nip: Option<String>,
        nim: Option<String>,
    ) -> Result<Self, UserValidationError> {
        let (nip, nim) = normalize_numbers(role, nip, nim)?;
        let now = Utc::now();

        Ok(Self {
            id,
            email: email.into(),
            name: name.into(),
            password_hash: password_hash.into(),
            role,
            nip,
            nim,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        })
    }

    /// Rebuild a user from persisted columns
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: UserId,
        email: String,
        name: String,
        password_hash: String,
        role: Role,
        nip: Option<String>,
        nim: Option<String>,
        status: UserStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        last_login_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            email,
            name,
            password_hash,
            role,
            nip,
            nim,
            status,
            created_at,
            updated_at,
            last_login_at,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn nip(&self) -> Option<&str> {
        self.nip.as_deref()
    }

    pub fn nim(&self) -> Option<&str> {
        self.nim.as_deref()
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    /// Roles granted to this user's tokens
    pub fn roles(&self) -> RoleSet {
        RoleSet::single(self.role)
    }

    /// Identity presented to the token issuer
    pub fn identity(&self) -> Identity {
        Identity::new(self.id.as_str(), &self.email, self.roles())
    }

    pub fn is_active(&self) -> bool {
        self.status.can_login()
    }

    // Mutators

    /// Change the role, keeping the NIP only when the new role is `dosen`
    pub fn set_role(&mut self, role: Role) -> Result<(), UserValidationError> {
        let (nip, nim) = normalize_numbers(role, self.nip.clone(), self.nim.clone())?;
        self.role = role;
        self.nip = nip;
        self.nim = nim;
        self.touch();
        Ok(())
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
    }

    pub fn suspend(&mut self) {
        self.status = UserStatus::Suspended;
        self.touch();
    }

    pub fn activate(&mut self) {
        if self.status == UserStatus::Suspended {
            self.status = UserStatus::Active;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn normalize_numbers(
    role: Role,
    nip: Option<String>,
    nim: Option<String>,
) -> Result<(Option<String>, Option<String>), UserValidationError> {
    let nip = match role {
        Role::Dosen => {
            validate_nip(nip.as_deref())?;
            nip.map(|n| n.trim().to_string())
        }
        _ => None,
    };

    let nim = match role {
        Role::Mahasiswa => nim
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        _ => None,
    };

    Ok((nip, nim))
}
