//! SeaORM-backed repository implementation for the domain ports.
//!
//! Generic over `C: ConnectionTrait + TransactionTrait`, so it can be built on
//! a `DatabaseConnection` or on anything else that can open a transaction.

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, DbErr, EntityTrait,
    NotSet, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use crate::contract::model::{NewUser, User};
use crate::domain::repo::{BlocksRepository, RepoError, RepoResult, UsersRepository};
use crate::domain::search::{escape_like, UserFilter, LIKE_ESCAPE};
use crate::infra::storage::entity::user::{
    ActiveModel as UserAM, Column as UserCol, Entity as UserEntity,
};
use crate::infra::storage::entity::user_block::{
    ActiveModel as BlockAM, Column as BlockCol, Entity as BlockEntity,
};

/// SeaORM repository impl for both users and block edges.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Split unique-index rejections out of the generic DB error.
fn classify(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(constraint)) => {
            RepoError::UniqueViolation { constraint }
        }
        _ => RepoError::Db(err),
    }
}

/// Lower-case `needle` the way the backend's `lower()` treats the column.
/// SQLite's built-in `lower()` only folds ASCII letters.
fn fold_case(backend: DbBackend, needle: &str) -> String {
    match backend {
        DbBackend::Sqlite => needle.to_ascii_lowercase(),
        _ => needle.to_lowercase(),
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i32) -> RepoResult<Option<User>> {
        let found = UserEntity::find_by_id(id).one(&self.conn).await?;
        Ok(found.map(Into::into))
    }

    async fn list_all(&self) -> RepoResult<Vec<User>> {
        let rows = UserEntity::find()
            .order_by_asc(UserCol::Id)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, new_user: NewUser) -> RepoResult<User> {
        let m = UserAM {
            id: NotSet,
            name: Set(new_user.name),
            surname: Set(new_user.surname),
            username: Set(new_user.username),
            birthdate: Set(new_user.birthdate),
        };
        let saved = m.insert(&self.conn).await.map_err(classify)?;
        Ok(saved.into())
    }

    async fn update(&self, u: User) -> RepoResult<User> {
        let m = UserAM {
            id: Set(u.id),
            name: Set(u.name),
            surname: Set(u.surname),
            username: Set(u.username),
            birthdate: Set(u.birthdate),
        };
        let saved = m.update(&self.conn).await.map_err(classify)?;
        Ok(saved.into())
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        let txn = self.conn.begin().await?;

        BlockEntity::delete_many()
            .filter(
                Condition::any()
                    .add(BlockCol::BlockerId.eq(id))
                    .add(BlockCol::BlockedId.eq(id)),
            )
            .exec(&txn)
            .await?;
        let res = UserEntity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    async fn search(&self, filter: &UserFilter) -> RepoResult<Vec<User>> {
        let mut query = UserEntity::find();

        if let Some(needle) = &filter.username_contains {
            let needle = fold_case(self.conn.get_database_backend(), needle);
            let pattern = format!("%{}%", escape_like(&needle));
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((UserEntity, UserCol::Username))))
                    .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            );
        }
        if let Some(latest) = filter.born_on_or_before {
            query = query.filter(UserCol::Birthdate.lte(latest));
        }
        if let Some(earliest) = filter.born_on_or_after {
            query = query.filter(UserCol::Birthdate.gte(earliest));
        }
        if !filter.exclude_ids.is_empty() {
            query = query.filter(UserCol::Id.is_not_in(filter.exclude_ids.iter().copied()));
        }

        let rows = query.order_by_asc(UserCol::Id).all(&self.conn).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait::async_trait]
impl<C> BlocksRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn blocked_ids(&self, blocker_id: i32) -> RepoResult<Vec<i32>> {
        let ids: Vec<i32> = BlockEntity::find()
            .select_only()
            .column(BlockCol::BlockedId)
            .filter(BlockCol::BlockerId.eq(blocker_id))
            .order_by_asc(BlockCol::BlockedId)
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(ids)
    }

    async fn add_block(&self, blocker_id: i32, blocked_id: i32) -> RepoResult<bool> {
        let existing = BlockEntity::find()
            .filter(BlockCol::BlockerId.eq(blocker_id))
            .filter(BlockCol::BlockedId.eq(blocked_id))
            .one(&self.conn)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let m = BlockAM {
            id: NotSet,
            blocker_id: Set(blocker_id),
            blocked_id: Set(blocked_id),
        };
        match m.insert(&self.conn).await.map_err(classify) {
            Ok(_) => Ok(true),
            // lost a race against a concurrent insert of the same pair
            Err(RepoError::UniqueViolation { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn remove_block(&self, blocker_id: i32, blocked_id: i32) -> RepoResult<bool> {
        let res = BlockEntity::delete_many()
            .filter(BlockCol::BlockerId.eq(blocker_id))
            .filter(BlockCol::BlockedId.eq(blocked_id))
            .exec(&self.conn)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
