use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{NewUser, SearchCriteria, User, UserBlocks, UserPatch};
use crate::domain::error::DomainError;

/// REST DTO for user representation with serde/utoipa
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub username: String,
    #[schema(value_type = String, format = Date, example = "1990-01-01")]
    pub birthdate: NaiveDate,
}

/// REST DTO for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    pub name: String,
    pub surname: String,
    pub username: String,
    #[schema(value_type = String, format = Date, example = "1990-01-01")]
    pub birthdate: NaiveDate,
}

/// REST DTO for updating a user (partial)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserReq {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub birthdate: Option<NaiveDate>,
}

/// Query string of `GET /users/search`.
///
/// Ages arrive as raw strings so that an empty value means "unset" and a
/// non-numeric one can be reported as an invalid query.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SearchUsersQuery {
    /// Case-insensitive username substring
    pub username: Option<String>,
    /// Minimum age in whole years (0-120)
    pub min_age: Option<String>,
    /// Maximum age in whole years (0-120)
    pub max_age: Option<String>,
}

impl SearchUsersQuery {
    pub fn into_criteria(self) -> Result<SearchCriteria, DomainError> {
        Ok(SearchCriteria {
            username: self.username,
            min_age: parse_age("minAge", self.min_age)?,
            max_age: parse_age("maxAge", self.max_age)?,
        })
    }
}

fn parse_age(field: &str, raw: Option<String>) -> Result<Option<u32>, DomainError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<u32>().map(Some).map_err(|_| {
            DomainError::invalid_query(format!("{field} must be a non-negative integer"))
        }),
    }
}

/// Body of `POST /block` and `DELETE /block`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockReq {
    pub blocker_id: i32,
    pub blocked_id: i32,
}

/// A blocker with the ids it currently blocks
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockerDto {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub username: String,
    #[schema(value_type = String, format = Date)]
    pub birthdate: NaiveDate,
    pub blocked_user_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageDto {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockResultDto {
    pub message: String,
    pub result: BlockerDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthDto {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            surname: user.surname,
            username: user.username,
            birthdate: user.birthdate,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            username: req.username,
            birthdate: req.birthdate,
        }
    }
}

impl From<UpdateUserReq> for UserPatch {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            username: req.username,
            birthdate: req.birthdate,
        }
    }
}

impl From<UserBlocks> for BlockerDto {
    fn from(b: UserBlocks) -> Self {
        Self {
            id: b.blocker.id,
            name: b.blocker.name,
            surname: b.blocker.surname,
            username: b.blocker.username,
            birthdate: b.blocker.birthdate,
            blocked_user_ids: b.blocked_user_ids,
        }
    }
}
