use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::UsersDirectoryApi,
    error::UsersDirectoryError,
    model::{NewUser, SearchCriteria, User, UserBlocks, UserPatch},
};
use crate::domain::service::Service;

/// In-process implementation of `UsersDirectoryApi` that delegates to the domain service
pub struct UsersDirectoryLocalClient {
    service: Arc<Service>,
}

impl UsersDirectoryLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UsersDirectoryApi for UsersDirectoryLocalClient {
    async fn get_user(&self, id: i32) -> Result<User, UsersDirectoryError> {
        self.service.get_user(id).await.map_err(Into::into)
    }

    async fn list_users(&self) -> Result<Vec<User>, UsersDirectoryError> {
        self.service.list_users().await.map_err(Into::into)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, UsersDirectoryError> {
        self.service.create_user(new_user).await.map_err(Into::into)
    }

    async fn update_user(&self, id: i32, patch: UserPatch) -> Result<User, UsersDirectoryError> {
        self.service
            .update_user(id, patch)
            .await
            .map_err(Into::into)
    }

    async fn delete_user(&self, id: i32) -> Result<(), UsersDirectoryError> {
        self.service.delete_user(id).await.map_err(Into::into)
    }

    async fn search_users(
        &self,
        criteria: SearchCriteria,
        requester_id: Option<i32>,
    ) -> Result<Vec<User>, UsersDirectoryError> {
        self.service
            .search_users(criteria, requester_id)
            .await
            .map_err(Into::into)
    }

    async fn block_user(
        &self,
        blocker_id: i32,
        blocked_id: i32,
    ) -> Result<UserBlocks, UsersDirectoryError> {
        self.service
            .block_user(blocker_id, blocked_id)
            .await
            .map_err(Into::into)
    }

    async fn unblock_user(
        &self,
        blocker_id: i32,
        blocked_id: i32,
    ) -> Result<UserBlocks, UsersDirectoryError> {
        self.service
            .unblock_user(blocker_id, blocked_id)
            .await
            .map_err(Into::into)
    }
}
