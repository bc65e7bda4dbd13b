use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{NewUser, SearchCriteria, User, UserBlocks, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::ports::CachePort;
use crate::domain::repo::{BlocksRepository, RepoError, UsersRepository};
use crate::domain::search::UserFilter;

/// Cache key holding the full, unfiltered user list.
pub const ALL_USERS_CACHE_KEY: &str = "allUsers";

/// Domain service with business rules for the user directory.
/// Depends only on the ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    blocks: Arc<dyn BlocksRepository>,
    cache: Arc<dyn CachePort>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_field_length: usize,
    pub list_cache_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_field_length: 100,
            list_cache_ttl: Duration::from_secs(600),
        }
    }
}

/// Wire shape of a user inside the cache.
#[derive(Serialize, Deserialize)]
struct CachedUser {
    id: i32,
    name: String,
    surname: String,
    username: String,
    birthdate: NaiveDate,
}

impl From<&User> for CachedUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            surname: u.surname.clone(),
            username: u.username.clone(),
            birthdate: u.birthdate,
        }
    }
}

impl From<CachedUser> for User {
    fn from(c: CachedUser) -> Self {
        Self {
            id: c.id,
            name: c.name,
            surname: c.surname,
            username: c.username,
            birthdate: c.birthdate,
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        users: Arc<dyn UsersRepository>,
        blocks: Arc<dyn BlocksRepository>,
        cache: Arc<dyn CachePort>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            blocks,
            cache,
            config,
        }
    }

    #[instrument(
        name = "users_directory.service.create_user",
        skip(self),
        fields(username = %new_user.username)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        self.validate_field("name", &new_user.name)?;
        self.validate_field("surname", &new_user.surname)?;
        self.validate_field("username", &new_user.username)?;

        let username = new_user.username.clone();
        let user = self
            .users
            .insert(new_user)
            .await
            .map_err(|e| write_error(e, &username))?;

        self.invalidate_user_list().await;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    /// All users, served from the list cache when it is warm.
    #[instrument(name = "users_directory.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        if let Some(users) = self.cached_user_list().await {
            debug!("Serving {} users from cache", users.len());
            return Ok(users);
        }

        let users = self.users.list_all().await.map_err(store_error)?;

        match serde_json::to_value(users.iter().map(CachedUser::from).collect::<Vec<_>>()) {
            Ok(payload) => {
                if let Err(e) = self
                    .cache
                    .set(ALL_USERS_CACHE_KEY, payload, self.config.list_cache_ttl)
                    .await
                {
                    warn!("Failed to populate user list cache: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode user list for cache: {}", e),
        }

        debug!("Loaded {} users from store", users.len());
        Ok(users)
    }

    #[instrument(name = "users_directory.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: i32) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.users
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(
        name = "users_directory.service.update_user",
        skip(self),
        fields(user_id = %id)
    )]
    pub async fn update_user(&self, id: i32, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");

        if let Some(ref name) = patch.name {
            self.validate_field("name", name)?;
        }
        if let Some(ref surname) = patch.surname {
            self.validate_field("surname", surname)?;
        }
        if let Some(ref username) = patch.username {
            self.validate_field("username", username)?;
        }

        let mut current = self.get_user(id).await?;

        if let Some(name) = patch.name {
            current.name = name;
        }
        if let Some(surname) = patch.surname {
            current.surname = surname;
        }
        if let Some(username) = patch.username {
            current.username = username;
        }
        if let Some(birthdate) = patch.birthdate {
            current.birthdate = birthdate;
        }

        let username = current.username.clone();
        let updated = self
            .users
            .update(current)
            .await
            .map_err(|e| write_error(e, &username))?;

        self.invalidate_user_list().await;

        info!("Successfully updated user");
        Ok(updated)
    }

    #[instrument(
        name = "users_directory.service.delete_user",
        skip(self),
        fields(user_id = %id)
    )]
    pub async fn delete_user(&self, id: i32) -> Result<(), DomainError> {
        info!("Deleting user");

        self.get_user(id).await?;

        let deleted = self.users.delete(id).await.map_err(store_error)?;
        if !deleted {
            return Err(DomainError::user_not_found(id));
        }

        self.invalidate_user_list().await;

        info!("Successfully deleted user");
        Ok(())
    }

    /// Search on behalf of `requester_id`, hiding everyone the requester blocks.
    #[instrument(
        name = "users_directory.service.search_users",
        skip(self, criteria),
        fields(requester_id = ?requester_id)
    )]
    pub async fn search_users(
        &self,
        criteria: SearchCriteria,
        requester_id: Option<i32>,
    ) -> Result<Vec<User>, DomainError> {
        let requester_id = requester_id
            .ok_or_else(|| DomainError::invalid_query("missing requesting user identity"))?;

        let requester = self
            .get_user(requester_id)
            .await
            .map_err(DomainError::into_query_error)?;

        let blocked = self
            .blocks
            .blocked_ids(requester.id)
            .await
            .map_err(|e| store_error(e).into_query_error())?;

        let today = Utc::now().date_naive();
        let filter = UserFilter::build(&criteria, today, blocked)?;

        let users = self
            .users
            .search(&filter)
            .await
            .map_err(|e| store_error(e).into_query_error())?;

        debug!("Search matched {} users", users.len());
        Ok(users)
    }

    #[instrument(
        name = "users_directory.service.block_user",
        skip(self),
        fields(blocker_id = %blocker_id, blocked_id = %blocked_id)
    )]
    pub async fn block_user(
        &self,
        blocker_id: i32,
        blocked_id: i32,
    ) -> Result<UserBlocks, DomainError> {
        if blocker_id == blocked_id {
            return Err(DomainError::validation(
                "blockedId",
                "a user cannot block themselves",
            ));
        }

        let blocker = self.load_pair(blocker_id, blocked_id).await?;

        let inserted = self
            .blocks
            .add_block(blocker_id, blocked_id)
            .await
            .map_err(store_error)?;
        if inserted {
            info!("Block recorded");
        } else {
            debug!("Block already present");
        }

        self.with_blocked_ids(blocker).await
    }

    #[instrument(
        name = "users_directory.service.unblock_user",
        skip(self),
        fields(blocker_id = %blocker_id, blocked_id = %blocked_id)
    )]
    pub async fn unblock_user(
        &self,
        blocker_id: i32,
        blocked_id: i32,
    ) -> Result<UserBlocks, DomainError> {
        let blocker = self.load_pair(blocker_id, blocked_id).await?;

        let removed = self
            .blocks
            .remove_block(blocker_id, blocked_id)
            .await
            .map_err(store_error)?;
        if removed {
            info!("Block removed");
        } else {
            debug!("No block to remove");
        }

        self.with_blocked_ids(blocker).await
    }

    /// Ids currently blocked by `blocker_id`, ascending.
    #[instrument(name = "users_directory.service.blocked_user_ids", skip(self))]
    pub async fn blocked_user_ids(&self, blocker_id: i32) -> Result<Vec<i32>, DomainError> {
        self.users
            .find_by_id(blocker_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| DomainError::blocker_not_found(blocker_id))?;
        self.blocks
            .blocked_ids(blocker_id)
            .await
            .map_err(store_error)
    }

    // --- helpers ---

    /// Loads both ends of a block edge, returning the blocker.
    async fn load_pair(&self, blocker_id: i32, blocked_id: i32) -> Result<User, DomainError> {
        let blocker = self
            .users
            .find_by_id(blocker_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| DomainError::blocker_not_found(blocker_id))?;
        self.users
            .find_by_id(blocked_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| DomainError::blocked_not_found(blocked_id))?;
        Ok(blocker)
    }

    async fn with_blocked_ids(&self, blocker: User) -> Result<UserBlocks, DomainError> {
        let blocked_user_ids = self
            .blocks
            .blocked_ids(blocker.id)
            .await
            .map_err(store_error)?;
        Ok(UserBlocks {
            blocker,
            blocked_user_ids,
        })
    }

    async fn cached_user_list(&self) -> Option<Vec<User>> {
        let payload = match self.cache.get(ALL_USERS_CACHE_KEY).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                warn!("User list cache read failed, treating as miss: {}", e);
                return None;
            }
        };
        match serde_json::from_value::<Vec<CachedUser>>(payload) {
            Ok(cached) => Some(cached.into_iter().map(User::from).collect()),
            Err(e) => {
                warn!("Discarding undecodable user list cache entry: {}", e);
                None
            }
        }
    }

    async fn invalidate_user_list(&self) {
        if let Err(e) = self.cache.delete(ALL_USERS_CACHE_KEY).await {
            warn!("Failed to invalidate user list cache: {}", e);
        }
    }

    fn validate_field(&self, field: &str, value: &str) -> Result<(), DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::validation(field, "must not be empty"));
        }
        let len = value.chars().count();
        if len > self.config.max_field_length {
            return Err(DomainError::validation(
                field,
                format!(
                    "too long: {len} characters (max: {})",
                    self.config.max_field_length
                ),
            ));
        }
        Ok(())
    }
}

fn store_error(e: RepoError) -> DomainError {
    DomainError::database(e.to_string())
}

fn write_error(e: RepoError, username: &str) -> DomainError {
    match e {
        RepoError::UniqueViolation { .. } => DomainError::username_taken(username),
        other => store_error(other),
    }
}
