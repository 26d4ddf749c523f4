use serde::{Deserialize, Serialize};

/// Account data as the user directory stores it.
///
/// `token` is the long-lived credential a remember-me cookie carries; it is
/// compared in constant time during resolution and must be rotated by the
/// directory whenever the user's sessions are to be invalidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub token: String,
}

impl UserRecord {
    pub fn new(id: u64, name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            token: token.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_record() {
        let user = UserRecord::new(7, "Alice", "0123456789abcdef0123456789abcdef");
        assert_eq!(user.id, 7);
        assert_eq!(user.name, "Alice");
        assert_eq!(user.token, "0123456789abcdef0123456789abcdef");
    }

    #[test]
    fn test_serde_round_trip() {
        let user = UserRecord::new(42, "Bob", "fedcba9876543210fedcba9876543210");
        let json = serde_json::to_string(&user).unwrap();
        let back: UserRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}
