use async_trait::async_trait;

use crate::contract::{
    error::UsersDirectoryError,
    model::{NewUser, SearchCriteria, User, UserBlocks, UserPatch},
};

/// Public API trait for the users_directory module that other crates can use
#[async_trait]
pub trait UsersDirectoryApi: Send + Sync {
    /// Get a user by ID
    async fn get_user(&self, id: i32) -> Result<User, UsersDirectoryError>;

    /// List every user (served from cache when warm)
    async fn list_users(&self) -> Result<Vec<User>, UsersDirectoryError>;

    /// Create a new user
    async fn create_user(&self, new_user: NewUser) -> Result<User, UsersDirectoryError>;

    /// Update a user with partial data
    async fn update_user(&self, id: i32, patch: UserPatch) -> Result<User, UsersDirectoryError>;

    /// Delete a user by ID
    async fn delete_user(&self, id: i32) -> Result<(), UsersDirectoryError>;

    /// Search users on behalf of `requester_id`, hiding users it has blocked
    async fn search_users(
        &self,
        criteria: SearchCriteria,
        requester_id: Option<i32>,
    ) -> Result<Vec<User>, UsersDirectoryError>;

    /// Record that `blocker_id` blocks `blocked_id`
    async fn block_user(
        &self,
        blocker_id: i32,
        blocked_id: i32,
    ) -> Result<UserBlocks, UsersDirectoryError>;

    /// Remove a block edge; absent edges are not an error
    async fn unblock_user(
        &self,
        blocker_id: i32,
        blocked_id: i32,
    ) -> Result<UserBlocks, UsersDirectoryError>;
}
