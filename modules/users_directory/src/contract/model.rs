use chrono::NaiveDate;

/// Pure user model for in-process consumers (no serde/utoipa)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub birthdate: NaiveDate,
}

/// Data for creating a new user; the id is assigned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub birthdate: NaiveDate,
}

/// Partial update data for a user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

/// Search filters; every present field narrows the result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchCriteria {
    /// Case-insensitive substring of the username.
    pub username: Option<String>,
    /// Inclusive lower bound on age in whole years.
    pub min_age: Option<u32>,
    /// Inclusive upper bound on age in whole years.
    pub max_age: Option<u32>,
}

/// A blocker together with the ids it currently blocks (ascending).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBlocks {
    pub blocker: User,
    pub blocked_user_ids: Vec<i32>,
}
