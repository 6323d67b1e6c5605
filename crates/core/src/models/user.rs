use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier as sent by a client. Returns `None` for anything
    /// that is not a well-formed id.
    pub fn parse(input: &str) -> Option<Self> {
        Uuid::parse_str(input.trim()).ok().map(Self)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// How a caller identifies the user an operation applies to.
///
/// When both an id and an email are known the id wins; the email is only
/// consulted if no user has that id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(UserId),
    Email(String),
    IdOrEmail(UserId, String),
    /// An id was supplied but is not well-formed; never matches a user.
    Unresolvable,
}

impl UserLookup {
    /// Build a lookup from the loose `userId` / `email` pair clients send.
    ///
    /// Blank values count as absent. An id that does not parse is dropped in
    /// favour of the email; with no email it becomes `Unresolvable`.
    pub fn from_parts(user_id: Option<&str>, email: Option<&str>) -> Option<Self> {
        let raw_id = user_id.map(str::trim).filter(|s| !s.is_empty());
        let email = email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());

        match (raw_id.map(UserId::parse), email) {
            (Some(Some(id)), Some(email)) => Some(Self::IdOrEmail(id, email)),
            (Some(Some(id)), None) => Some(Self::Id(id)),
            (_, Some(email)) => Some(Self::Email(email)),
            (Some(None), None) => Some(Self::Unresolvable),
            (None, None) => None,
        }
    }

    pub fn id(&self) -> Option<UserId> {
        match self {
            Self::Id(id) | Self::IdOrEmail(id, _) => Some(*id),
            _ => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Email(email) | Self::IdOrEmail(_, email) => Some(email),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_parts_give_no_lookup() {
        assert_eq!(UserLookup::from_parts(None, None), None);
        assert_eq!(UserLookup::from_parts(Some("  "), Some("")), None);
    }

    #[test]
    fn test_email_is_normalized() {
        let lookup = UserLookup::from_parts(None, Some("  Ada@Example.COM ")).unwrap();
        assert_eq!(lookup, UserLookup::Email("ada@example.com".into()));
    }

    #[test]
    fn test_id_and_email_keep_both() {
        let id = UserId::new();
        let lookup = UserLookup::from_parts(Some(id.to_string().as_str()), Some("a@b.c")).unwrap();
        assert_eq!(lookup.id(), Some(id));
        assert_eq!(lookup.email(), Some("a@b.c"));
    }

    #[test]
    fn test_malformed_id_falls_back_to_email() {
        let lookup = UserLookup::from_parts(Some("not-an-id"), Some("a@b.c")).unwrap();
        assert_eq!(lookup, UserLookup::Email("a@b.c".into()));

        let lookup = UserLookup::from_parts(Some("not-an-id"), None).unwrap();
        assert_eq!(lookup, UserLookup::Unresolvable);
    }
}
