use std::collections::HashMap;

use super::types::UserRecord;

/// Account lookups the provider verifies cookie claims against.
///
/// Both lookups are pure reads. A miss means "no such account" and resolves
/// to "no candidate" upstream; it is never an error. Implementations back
/// this with whatever store holds the accounts.
pub trait UserDirectory: Send + Sync {
    fn find_user_by_id(&self, id: u64) -> Option<UserRecord>;
    fn find_user_by_name(&self, name: &str) -> Option<UserRecord>;
}

/// HashMap-backed directory for tests and single-process embedders.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    by_id: HashMap<u64, UserRecord>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        let mut directory = Self::new();
        for user in users {
            directory.insert(user);
        }
        directory
    }

    /// Adds or replaces the record for `user.id`.
    pub fn insert(&mut self, user: UserRecord) {
        self.by_id.insert(user.id, user);
    }
}

impl UserDirectory for MemoryUserDirectory {
    fn find_user_by_id(&self, id: u64) -> Option<UserRecord> {
        self.by_id.get(&id).cloned()
    }

    fn find_user_by_name(&self, name: &str) -> Option<UserRecord> {
        self.by_id.values().find(|user| user.name == name).cloned()
    }
}
