//! User and role models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role
///
/// Closed enumeration; the database stores the lowercase string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Store,
    Admin,
}

impl Role {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "store" => Some(Self::Store),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Store => "store",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

/// User entity (database row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// Role as stored (`user` / `store` / `admin`)
    pub role: String,
    pub is_approved: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Parsed role; unknown strings fall back to the plain user role
    pub fn role(&self) -> Role {
        Role::from_db(&self.role).unwrap_or_default()
    }
}

/// Public projection of a user (no credentials)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_approved: bool,
    pub created_at: i64,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: Role::from_db(&u.role).unwrap_or_default(),
            is_approved: u.is_approved,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_db_round_trip() {
        for role in [Role::User, Role::Store, Role::Admin] {
            assert_eq!(Role::from_db(role.as_db()), Some(role));
        }
    }

    #[test]
    fn test_role_from_db_rejects_unknown() {
        assert_eq!(Role::from_db("superadmin"), None);
        assert_eq!(Role::from_db("Admin"), None);
        assert_eq!(Role::from_db(""), None);
    }

    #[test]
    fn test_role_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
        assert!(!Role::Store.is_admin());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"store\"").unwrap();
        assert_eq!(role, Role::Store);
    }

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            hashed_password: "$argon2id$...".into(),
            role: "user".into(),
            is_approved: true,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_user_never_serializes_password() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_user_public_projection() {
        let user = sample_user();
        let id = user.id;
        let public = UserPublic::from(user);
        assert_eq!(public.id, id);
        assert_eq!(public.role, Role::User);
        assert!(public.is_approved);
    }

    #[test]
    fn test_unknown_role_falls_back_to_user() {
        let mut user = sample_user();
        user.role = "mystery".into();
        assert_eq!(user.role(), Role::User);
    }
}
