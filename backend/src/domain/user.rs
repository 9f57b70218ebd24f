//! User accounts and their membership tier.
//!
//! Field values are validated at construction: usernames, emails and
//! password hashes are never blank once a `User` exists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::entity::{Entity, UniqueKey, define_entity_id};

define_entity_id! {
    /// Stable user identifier assigned by the store.
    UserId
}

/// Membership tier granted to a user or required by a workout plan.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum MembershipTier {
    /// Free tier.
    #[default]
    Basic,
    /// Intermediate paid tier.
    Advance,
    /// Top tier.
    High,
}

impl MembershipTier {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Advance => "Advance",
            Self::High => "High",
        }
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored tier name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown membership tier: {0}")]
pub struct UnknownMembershipTier(pub String);

impl FromStr for MembershipTier {
    type Err = UnknownMembershipTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Basic" => Ok(Self::Basic),
            "Advance" => Ok(Self::Advance),
            "High" => Ok(Self::High),
            other => Err(UnknownMembershipTier(other.to_owned())),
        }
    }
}

/// Validation errors for user fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Returns true when `value` has no visible characters.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Login name, unique across users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and wrap a username.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if is_blank(&value) {
            return Err(UserValidationError::EmptyUsername);
        }
        Ok(Self(value))
    }

    /// Borrow the raw username.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Contact email, unique across users ignoring ASCII case.
///
/// No format check is applied; the address is stored as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and wrap an email address.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if is_blank(&value) {
            return Err(UserValidationError::EmptyEmail);
        }
        Ok(Self(value))
    }

    /// Borrow the raw address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Case-folded form used for uniqueness checks.
    pub fn normalised(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Encoded password hash. Never holds plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a [`PasswordHasher`](super::ports::PasswordHasher).
    pub fn new(encoded: impl Into<String>) -> Result<Self, UserValidationError> {
        let encoded = encoded.into();
        if is_blank(&encoded) {
            return Err(UserValidationError::EmptyPassword);
        }
        Ok(Self(encoded))
    }

    /// Borrow the encoded hash.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// A user account that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub password_hash: PasswordHash,
    pub membership_tier: MembershipTier,
}

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: Email,
    password_hash: PasswordHash,
    membership_tier: MembershipTier,
}

impl User {
    /// Reassemble a stored user.
    pub fn new(id: UserId, draft: NewUser) -> Self {
        let NewUser {
            username,
            email,
            password_hash,
            membership_tier,
        } = draft;
        Self {
            id,
            username,
            email,
            password_hash,
            membership_tier,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn membership_tier(&self) -> MembershipTier {
        self.membership_tier
    }

    /// Copy of this user with a different tier.
    #[must_use]
    pub fn with_membership_tier(mut self, tier: MembershipTier) -> Self {
        self.membership_tier = tier;
        self
    }
}

impl Entity for User {
    type Id = UserId;
    type Draft = NewUser;

    const KIND: &'static str = "user";

    fn id(&self) -> UserId {
        self.id
    }

    fn from_draft(id: UserId, draft: NewUser) -> Self {
        Self::new(id, draft)
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![
            UniqueKey::new("username", self.username.as_str()),
            UniqueKey::new("email", self.email.normalised()),
        ]
    }
}

/// Public view of a user. Has no password field.
///
/// ```
/// use fittrack::domain::UserSummary;
///
/// let schema = serde_json::to_value(UserSummary {
///     id: fittrack::domain::UserId::new(1),
///     username: "alice".into(),
///     email: "alice@x.com".into(),
///     membership_tier: Default::default(),
/// })
/// .unwrap();
/// assert!(schema.get("password").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub membership_tier: MembershipTier,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            membership_tier: user.membership_tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_user() -> User {
        User::new(
            UserId::new(1),
            NewUser {
                username: Username::new("alice").expect("valid username"),
                email: Email::new("Alice@X.com").expect("valid email"),
                password_hash: PasswordHash::new("$argon2id$stub").expect("valid hash"),
                membership_tier: MembershipTier::default(),
            },
        )
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn username_rejects_blank_values(#[case] raw: &str) {
        assert_eq!(Username::new(raw), Err(UserValidationError::EmptyUsername));
    }

    #[rstest]
    #[case("ünïcødé")]
    #[case("名前")]
    #[case("a user with spaces")]
    fn username_accepts_unicode_and_spaces(#[case] raw: &str) {
        assert_eq!(Username::new(raw).map(|u| u.as_str().to_owned()), Ok(raw.to_owned()));
    }

    #[rstest]
    fn email_does_not_check_format() {
        assert!(Email::new("not-an-email").is_ok());
    }

    #[rstest]
    #[case("Basic", MembershipTier::Basic)]
    #[case("Advance", MembershipTier::Advance)]
    #[case("High", MembershipTier::High)]
    fn tier_parses_storage_names(#[case] raw: &str, #[case] expected: MembershipTier) {
        assert_eq!(raw.parse::<MembershipTier>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    fn tier_rejects_unknown_names() {
        assert!("Gold".parse::<MembershipTier>().is_err());
    }

    #[rstest]
    fn tier_defaults_to_basic() {
        assert_eq!(MembershipTier::default(), MembershipTier::Basic);
    }

    #[rstest]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("secret-hash").expect("valid hash");
        assert!(!format!("{hash:?}").contains("secret-hash"));
    }

    #[rstest]
    fn unique_keys_fold_email_case() {
        let keys = sample_user().unique_keys();
        assert!(keys.contains(&UniqueKey::new("email", "alice@x.com")));
        assert!(keys.contains(&UniqueKey::new("username", "alice")));
    }

    #[rstest]
    fn summary_serialises_without_password() {
        let value = serde_json::to_value(UserSummary::from(&sample_user())).expect("serialises");
        assert_eq!(
            value,
            serde_json::json!({
                "id": 1,
                "username": "alice",
                "email": "Alice@X.com",
                "membershipTier": "Basic",
            })
        );
    }
}
