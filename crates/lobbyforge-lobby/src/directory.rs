//! Lookup of display names for joining users.

use std::collections::HashMap;
use std::future::Future;

use lobbyforge_protocol::UserId;

use crate::DirectoryError;

/// A user as known to the identity directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: UserId,
    pub display_name: String,
}

/// Resolves user ids to account records.
///
/// Unknown ids are simply absent from the returned map.
pub trait IdentityDirectory: Send + Sync + 'static {
    fn users_by_id(
        &self,
        ids: &[UserId],
    ) -> impl Future<Output = Result<HashMap<UserId, UserRecord>, DirectoryError>> + Send;
}

/// In-memory [`IdentityDirectory`], for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    users: HashMap<UserId, UserRecord>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        self.insert(user_id, display_name);
        self
    }

    pub fn insert(&mut self, user_id: impl Into<UserId>, display_name: impl Into<String>) {
        let user_id = user_id.into();
        self.users.insert(
            user_id.clone(),
            UserRecord {
                user_id,
                display_name: display_name.into(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl IdentityDirectory for MemoryDirectory {
    async fn users_by_id(
        &self,
        ids: &[UserId],
    ) -> Result<HashMap<UserId, UserRecord>, DirectoryError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|r| (id.clone(), r.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_directory_returns_known_users_only() {
        let dir = MemoryDirectory::new()
            .with_user("u-1", "Ann")
            .with_user("u-2", "Bo");

        let found = dir
            .users_by_id(&[UserId::from("u-1"), UserId::from("u-404")])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[&UserId::from("u-1")].display_name, "Ann");
    }

    #[tokio::test]
    async fn test_memory_directory_empty_query() {
        let dir = MemoryDirectory::new().with_user("u-1", "Ann");
        assert!(dir.users_by_id(&[]).await.unwrap().is_empty());
        assert_eq!(dir.len(), 1);
    }
}
