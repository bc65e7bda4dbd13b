#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use sea_orm::{Database, DatabaseConnection};

use users_directory::config::UsersDirectoryConfig;
use users_directory::domain::search::years_before;
use users_directory::model::NewUser;
use users_directory::UsersDirectory;

/// Fresh in-memory SQLite database with migrations applied.
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    UsersDirectory::migrate(&db)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn create_test_directory() -> UsersDirectory {
    UsersDirectory::init(create_test_db().await, &UsersDirectoryConfig::default())
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Birthdate of someone turning `years` old today.
pub fn born_years_ago(years: u32) -> NaiveDate {
    years_before(Utc::now().date_naive(), years).unwrap()
}

pub fn new_user(username: &str, birthdate: NaiveDate) -> NewUser {
    NewUser {
        name: "Test".to_string(),
        surname: "User".to_string(),
        username: username.to_string(),
        birthdate,
    }
}
