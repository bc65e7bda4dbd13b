use std::collections::BTreeSet;

use chrono::{Months, NaiveDate};

use crate::contract::model::{SearchCriteria, User};
use crate::domain::error::DomainError;

/// Oldest age a search may ask for.
pub const MAX_AGE_YEARS: u32 = 120;

/// Store-level predicate set for a user search.
///
/// Every populated field narrows the result; an empty filter matches all users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Substring the username must contain, compared case-insensitively.
    /// Kept as typed; each store folds case the way its `lower()` does.
    pub username_contains: Option<String>,
    /// Users born on or before this date (the `min_age` bound).
    pub born_on_or_before: Option<NaiveDate>,
    /// Users born on or after this date (the `max_age` bound).
    pub born_on_or_after: Option<NaiveDate>,
    /// Ids that must not appear in the result.
    pub exclude_ids: BTreeSet<i32>,
}

impl UserFilter {
    /// Translate age-based criteria into birthdate bounds relative to `today`.
    pub fn build(
        criteria: &SearchCriteria,
        today: NaiveDate,
        exclude_ids: impl IntoIterator<Item = i32>,
    ) -> Result<Self, DomainError> {
        let born_on_or_before = criteria
            .min_age
            .map(|age| bound_for_age("minAge", age, today))
            .transpose()?;
        let born_on_or_after = criteria
            .max_age
            .map(|age| bound_for_age("maxAge", age, today))
            .transpose()?;

        let username_contains = criteria.username.clone().filter(|s| !s.is_empty());

        Ok(Self {
            username_contains,
            born_on_or_before,
            born_on_or_after,
            exclude_ids: exclude_ids.into_iter().collect(),
        })
    }

    /// Evaluate the filter against an in-memory user.
    pub fn matches(&self, user: &User) -> bool {
        if let Some(needle) = &self.username_contains {
            if !user.username.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(latest) = self.born_on_or_before {
            if user.birthdate > latest {
                return false;
            }
        }
        if let Some(earliest) = self.born_on_or_after {
            if user.birthdate < earliest {
                return false;
            }
        }
        !self.exclude_ids.contains(&user.id)
    }
}

fn bound_for_age(field: &str, age: u32, today: NaiveDate) -> Result<NaiveDate, DomainError> {
    if age > MAX_AGE_YEARS {
        return Err(DomainError::invalid_query(format!(
            "{field} must be between 0 and {MAX_AGE_YEARS}"
        )));
    }
    years_before(today, age)
        .ok_or_else(|| DomainError::invalid_query(format!("{field} is out of range")))
}

/// `date` shifted back by whole years. Feb 29 lands on Feb 28 in common years.
pub fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(years.checked_mul(12)?))
}

/// Escape character used in LIKE patterns built by [`escape_like`].
pub const LIKE_ESCAPE: char = '!';

/// Escape `%`, `_` and the escape character itself so the needle is matched
/// literally inside a LIKE pattern.
pub fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}
