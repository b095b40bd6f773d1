use async_trait::async_trait;

use super::entity::StoredUser;
use crate::error::persistence::PersistenceError;

/// Access to the stored users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<StoredUser>, PersistenceError>;

    async fn find(&self, id: i64) -> Result<Option<StoredUser>, PersistenceError>;

    /// Inserts a user ignoring its id and returns the stored row.
    async fn insert(&self, user: &StoredUser) -> Result<Option<StoredUser>, PersistenceError>;

    /// Overwrites every field of the user with the same id, `None` if absent.
    async fn update(&self, user: &StoredUser) -> Result<Option<StoredUser>, PersistenceError>;

    /// Returns whether a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, PersistenceError>;
}
