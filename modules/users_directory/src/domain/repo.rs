use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

use crate::contract::model::{NewUser, User};
use crate::domain::search::UserFilter;

/// Failures reported by the storage adapters.
#[derive(Error, Debug)]
pub enum RepoError {
    /// A unique index rejected the write.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Port for the domain layer: user persistence.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id.
    async fn find_by_id(&self, id: i32) -> RepoResult<Option<User>>;
    /// Every user, ordered by id.
    async fn list_all(&self) -> RepoResult<Vec<User>>;
    /// Persist a new user; the store assigns the id.
    async fn insert(&self, new_user: NewUser) -> RepoResult<User>;
    /// Overwrite an existing user (by primary key in `u.id`).
    async fn update(&self, u: User) -> RepoResult<User>;
    /// Delete by id together with every block edge touching it.
    /// Returns true if a row was deleted.
    async fn delete(&self, id: i32) -> RepoResult<bool>;
    /// Users matching every predicate in `filter`, ordered by id.
    async fn search(&self, filter: &UserFilter) -> RepoResult<Vec<User>>;
}

/// Port for directed blocker -> blocked edges.
#[async_trait]
pub trait BlocksRepository: Send + Sync {
    /// Ids blocked by `blocker_id`, ascending.
    async fn blocked_ids(&self, blocker_id: i32) -> RepoResult<Vec<i32>>;
    /// Insert the edge unless present. Returns true if a new edge was written.
    async fn add_block(&self, blocker_id: i32, blocked_id: i32) -> RepoResult<bool>;
    /// Remove the edge if present. Returns true if an edge was removed.
    async fn remove_block(&self, blocker_id: i32, blocked_id: i32) -> RepoResult<bool>;
}
