//! Integration tests for the users_directory module.
//!
//! Each test runs on a fresh in-memory SQLite DB with migrations applied and
//! drives the domain service wired onto the SeaORM repository.

mod common;

use std::sync::Arc;

use users_directory::config::UsersDirectoryConfig;
use users_directory::contract::{SearchCriteria, UserPatch, UsersDirectoryError};
use users_directory::domain::error::DomainError;
use users_directory::domain::repo::UsersRepository;
use users_directory::domain::service::ALL_USERS_CACHE_KEY;
use users_directory::infra::cache::InMemoryCache;
use users_directory::infra::storage::SeaOrmUsersRepository;
use users_directory::domain::ports::CachePort;
use users_directory::UsersDirectory;

use common::{born_years_ago, create_test_db, create_test_directory, new_user, ymd};

#[tokio::test]
async fn create_then_get_roundtrips() {
    let dir = create_test_directory().await;
    let svc = dir.service();

    let created = svc
        .create_user(new_user("ada", ymd(1990, 1, 1)))
        .await
        .unwrap();
    assert!(created.id > 0);

    let fetched = svc.get_user(created.id).await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.birthdate, ymd(1990, 1, 1));
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let svc = create_test_directory().await.service();
    svc.create_user(new_user("ada", ymd(1990, 1, 1)))
        .await
        .unwrap();

    let err = svc
        .create_user(new_user("ada", ymd(1991, 1, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UsernameTaken { ref username } if username == "ada"));
}

#[tokio::test]
async fn create_rejects_blank_and_oversized_fields() {
    let svc = create_test_directory().await.service();

    let mut blank = new_user("ada", ymd(1990, 1, 1));
    blank.name = "   ".into();
    assert!(matches!(
        svc.create_user(blank).await,
        Err(DomainError::Validation { ref field, .. }) if field == "name"
    ));

    let long = new_user(&"x".repeat(101), ymd(1990, 1, 1));
    assert!(matches!(
        svc.create_user(long).await,
        Err(DomainError::Validation { ref field, .. }) if field == "username"
    ));
}

#[tokio::test]
async fn list_is_served_from_cache_until_a_write() {
    let db = create_test_db().await;
    let cache = Arc::new(InMemoryCache::new());
    let dir = UsersDirectory::with_cache(db.clone(), cache.clone(), &UsersDirectoryConfig::default());
    let svc = dir.service();

    svc.create_user(new_user("ada", ymd(1990, 1, 1)))
        .await
        .unwrap();
    assert_eq!(svc.list_users().await.unwrap().len(), 1);
    assert!(cache.get(ALL_USERS_CACHE_KEY).await.unwrap().is_some());

    // A write that bypasses the service is invisible while the cache is warm.
    let raw = SeaOrmUsersRepository::new(db);
    raw.insert(new_user("grace", ymd(1985, 5, 5))).await.unwrap();
    assert_eq!(svc.list_users().await.unwrap().len(), 1);

    // Any write through the service invalidates the entry.
    svc.create_user(new_user("linus", ymd(1970, 1, 1)))
        .await
        .unwrap();
    assert!(cache.get(ALL_USERS_CACHE_KEY).await.unwrap().is_none());

    let names: Vec<_> = svc
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, ["ada", "grace", "linus"]);
}

#[tokio::test]
async fn update_and_delete_invalidate_list_cache() {
    let db = create_test_db().await;
    let cache = Arc::new(InMemoryCache::new());
    let svc = UsersDirectory::with_cache(db, cache.clone(), &UsersDirectoryConfig::default())
        .service();

    let ada = svc
        .create_user(new_user("ada", ymd(1990, 1, 1)))
        .await
        .unwrap();

    svc.list_users().await.unwrap();
    let patch = UserPatch {
        name: Some("Augusta".into()),
        ..Default::default()
    };
    svc.update_user(ada.id, patch).await.unwrap();
    assert!(cache.get(ALL_USERS_CACHE_KEY).await.unwrap().is_none());
    assert_eq!(svc.list_users().await.unwrap()[0].name, "Augusta");

    svc.delete_user(ada.id).await.unwrap();
    assert!(cache.get(ALL_USERS_CACHE_KEY).await.unwrap().is_none());
    assert!(svc.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_merges_only_supplied_fields() {
    let svc = create_test_directory().await.service();
    let ada = svc
        .create_user(new_user("ada", ymd(1990, 1, 1)))
        .await
        .unwrap();

    let patch = UserPatch {
        surname: Some("King".into()),
        birthdate: Some(ymd(1815, 12, 10)),
        ..Default::default()
    };
    let updated = svc.update_user(ada.id, patch).await.unwrap();
    assert_eq!(updated.name, ada.name);
    assert_eq!(updated.username, "ada");
    assert_eq!(updated.surname, "King");
    assert_eq!(updated.birthdate, ymd(1815, 12, 10));
    assert_eq!(svc.get_user(ada.id).await.unwrap(), updated);
}

#[tokio::test]
async fn update_to_taken_username_conflicts_and_missing_user_is_not_found() {
    let svc = create_test_directory().await.service();
    let ada = svc
        .create_user(new_user("ada", ymd(1990, 1, 1)))
        .await
        .unwrap();
    svc.create_user(new_user("grace", ymd(1990, 1, 1)))
        .await
        .unwrap();

    let patch = UserPatch {
        username: Some("grace".into()),
        ..Default::default()
    };
    assert!(matches!(
        svc.update_user(ada.id, patch).await,
        Err(DomainError::UsernameTaken { .. })
    ));

    assert!(matches!(
        svc.update_user(999, UserPatch::default()).await,
        Err(DomainError::UserNotFound { id: 999 })
    ));
}

#[tokio::test]
async fn delete_missing_user_is_not_found() {
    let svc = create_test_directory().await.service();
    assert!(matches!(
        svc.delete_user(42).await,
        Err(DomainError::UserNotFound { id: 42 })
    ));
}

#[tokio::test]
async fn delete_releases_block_edges() {
    let svc = create_test_directory().await.service();
    let a = svc.create_user(new_user("a", ymd(1990, 1, 1))).await.unwrap();
    let b = svc.create_user(new_user("b", ymd(1990, 1, 1))).await.unwrap();
    let c = svc.create_user(new_user("c", ymd(1990, 1, 1))).await.unwrap();

    svc.block_user(a.id, b.id).await.unwrap();
    svc.block_user(b.id, c.id).await.unwrap();

    svc.delete_user(b.id).await.unwrap();
    assert!(svc.blocked_user_ids(a.id).await.unwrap().is_empty());
    assert!(matches!(
        svc.get_user(b.id).await,
        Err(DomainError::UserNotFound { .. })
    ));
}

#[tokio::test]
async fn block_is_idempotent_and_unblock_removes_edge() {
    let svc = create_test_directory().await.service();
    let a = svc.create_user(new_user("a", ymd(1990, 1, 1))).await.unwrap();
    let b = svc.create_user(new_user("b", ymd(1990, 1, 1))).await.unwrap();

    let first = svc.block_user(a.id, b.id).await.unwrap();
    assert_eq!(first.blocker.id, a.id);
    assert_eq!(first.blocked_user_ids, vec![b.id]);

    let second = svc.block_user(a.id, b.id).await.unwrap();
    assert_eq!(second.blocked_user_ids, vec![b.id]);

    let after = svc.unblock_user(a.id, b.id).await.unwrap();
    assert!(after.blocked_user_ids.is_empty());

    // removing an absent edge is a no-op
    let again = svc.unblock_user(a.id, b.id).await.unwrap();
    assert!(again.blocked_user_ids.is_empty());
}

#[tokio::test]
async fn block_validates_both_sides() {
    let svc = create_test_directory().await.service();
    let a = svc.create_user(new_user("a", ymd(1990, 1, 1))).await.unwrap();

    assert!(matches!(
        svc.block_user(a.id, a.id).await,
        Err(DomainError::Validation { .. })
    ));
    assert!(matches!(
        svc.block_user(a.id, 77).await,
        Err(DomainError::BlockedNotFound { id: 77 })
    ));
    assert!(matches!(
        svc.block_user(77, a.id).await,
        Err(DomainError::BlockerNotFound { id: 77 })
    ));
    assert!(matches!(
        svc.unblock_user(a.id, 78).await,
        Err(DomainError::BlockedNotFound { id: 78 })
    ));
}

#[tokio::test]
async fn search_hides_users_blocked_by_requester() {
    let svc = create_test_directory().await.service();
    let a = svc.create_user(new_user("alice", ymd(1990, 1, 1))).await.unwrap();
    let b = svc.create_user(new_user("bob", ymd(1990, 1, 1))).await.unwrap();
    let c = svc.create_user(new_user("carol", ymd(1990, 1, 1))).await.unwrap();

    svc.block_user(a.id, b.id).await.unwrap();

    let ids: Vec<_> = svc
        .search_users(SearchCriteria::default(), Some(a.id))
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(ids, vec![a.id, c.id]);

    // blocking is directed: bob still sees alice
    let ids: Vec<_> = svc
        .search_users(SearchCriteria::default(), Some(b.id))
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn search_username_is_case_insensitive_and_literal() {
    let svc = create_test_directory().await.service();
    let me = svc.create_user(new_user("me", ymd(1990, 1, 1))).await.unwrap();
    svc.create_user(new_user("Ada_King", ymd(1990, 1, 1))).await.unwrap();
    svc.create_user(new_user("adaxking", ymd(1990, 1, 1))).await.unwrap();

    let by = |username: &str| SearchCriteria {
        username: Some(username.into()),
        ..Default::default()
    };

    let found = svc.search_users(by("ADA"), Some(me.id)).await.unwrap();
    assert_eq!(found.len(), 2);

    let found = svc.search_users(by("a_k"), Some(me.id)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "Ada_King");

    let found = svc.search_users(by("%"), Some(me.id)).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn search_finds_non_ascii_usernames() {
    let svc = create_test_directory().await.service();
    let me = svc.create_user(new_user("me", ymd(1990, 1, 1))).await.unwrap();
    let adam = svc.create_user(new_user("ÁDAM", ymd(1990, 1, 1))).await.unwrap();
    svc.create_user(new_user("zoë", ymd(1990, 1, 1))).await.unwrap();

    for needle in ["ÁDAM", "Ádam", "ÁD", "dam"] {
        let criteria = SearchCriteria {
            username: Some(needle.into()),
            ..Default::default()
        };
        let found = svc.search_users(criteria, Some(me.id)).await.unwrap();
        assert_eq!(found.len(), 1, "{needle}");
        assert_eq!(found[0].id, adam.id, "{needle}");
    }

    let criteria = SearchCriteria {
        username: Some("ZOë".into()),
        ..Default::default()
    };
    let found = svc.search_users(criteria, Some(me.id)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "zoë");
}

#[tokio::test]
async fn search_by_age_range_is_inclusive() {
    let svc = create_test_directory().await.service();
    let me = svc.create_user(new_user("me", born_years_ago(40))).await.unwrap();
    let teen = svc.create_user(new_user("teen", born_years_ago(15))).await.unwrap();
    let adult = svc.create_user(new_user("adult", born_years_ago(18))).await.unwrap();
    let senior = svc.create_user(new_user("senior", born_years_ago(70))).await.unwrap();

    let ids = |users: Vec<users_directory::model::User>| -> Vec<i32> {
        users.into_iter().map(|u| u.id).collect()
    };

    let criteria = SearchCriteria {
        min_age: Some(18),
        max_age: Some(40),
        ..Default::default()
    };
    let found = svc.search_users(criteria, Some(me.id)).await.unwrap();
    assert_eq!(ids(found), vec![me.id, adult.id]);

    let criteria = SearchCriteria {
        max_age: Some(17),
        ..Default::default()
    };
    let found = svc.search_users(criteria, Some(me.id)).await.unwrap();
    assert_eq!(ids(found), vec![teen.id]);

    let criteria = SearchCriteria {
        min_age: Some(65),
        ..Default::default()
    };
    let found = svc.search_users(criteria, Some(me.id)).await.unwrap();
    assert_eq!(ids(found), vec![senior.id]);
}

#[tokio::test]
async fn search_requires_a_resolvable_requester() {
    let svc = create_test_directory().await.service();

    assert!(matches!(
        svc.search_users(SearchCriteria::default(), None).await,
        Err(DomainError::InvalidQuery { .. })
    ));
    assert!(matches!(
        svc.search_users(SearchCriteria::default(), Some(404)).await,
        Err(DomainError::UserNotFound { id: 404 })
    ));

    let me = svc.create_user(new_user("me", ymd(1990, 1, 1))).await.unwrap();
    let criteria = SearchCriteria {
        min_age: Some(500),
        ..Default::default()
    };
    assert!(matches!(
        svc.search_users(criteria, Some(me.id)).await,
        Err(DomainError::InvalidQuery { .. })
    ));
}

#[tokio::test]
async fn local_client_maps_errors_to_contract() {
    let dir = create_test_directory().await;
    let client = dir.client();

    let ada = client
        .create_user(new_user("ada", ymd(1990, 1, 1)))
        .await
        .unwrap();
    assert_eq!(client.get_user(ada.id).await.unwrap(), ada);
    assert_eq!(client.list_users().await.unwrap(), vec![ada.clone()]);

    assert_eq!(
        client.get_user(999).await.unwrap_err(),
        UsersDirectoryError::NotFound { id: 999 }
    );
    assert_eq!(
        client
            .create_user(new_user("ada", ymd(1990, 1, 1)))
            .await
            .unwrap_err(),
        UsersDirectoryError::Conflict {
            username: "ada".into()
        }
    );
    assert!(matches!(
        client.search_users(SearchCriteria::default(), None).await,
        Err(UsersDirectoryError::InvalidQuery { .. })
    ));

    let grace = client
        .create_user(new_user("grace", ymd(1990, 1, 1)))
        .await
        .unwrap();
    let blocks = client.block_user(ada.id, grace.id).await.unwrap();
    assert_eq!(blocks.blocked_user_ids, vec![grace.id]);
    let blocks = client.unblock_user(ada.id, grace.id).await.unwrap();
    assert!(blocks.blocked_user_ids.is_empty());

    client.delete_user(grace.id).await.unwrap();
    assert_eq!(
        client.delete_user(grace.id).await.unwrap_err(),
        UsersDirectoryError::NotFound { id: grace.id }
    );
}
