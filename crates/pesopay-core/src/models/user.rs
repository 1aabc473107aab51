use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user's account profile.
///
/// Read-mostly: every login or profile fetch replaces the whole value,
/// fields are never mutated individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_user_shape() {
        let json = r#"{
            "_id": "64f1c0a2e4b0a1b2c3d4e5f6",
            "name": "Maria Santos",
            "email": "maria@example.com",
            "role": "user",
            "createdAt": "2024-03-01T08:30:00.000Z"
        }"#;

        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "64f1c0a2e4b0a1b2c3d4e5f6");
        assert_eq!(user.email, "maria@example.com");
        assert!(user.created_at.is_some());
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let json = r#"{"_id": "u1", "name": "Jo", "email": "jo@example.com"}"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, None);
        assert_eq!(user.created_at, None);
    }
}
