use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub joined_at: DateTime<Utc>,
}

impl User {
    /// A not-yet-persisted user. `id` is filled in by the repository on insert.
    #[must_use]
    pub fn new(email: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        Self {
            id: 0,
            email: email.into(),
            hashed_password: hashed_password.into(),
            first_name: None,
            last_name: None,
            bio: None,
            birthdate: None,
            joined_at: Utc::now(),
        }
    }
}

/// Sparse update of a user row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

impl UserPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.hashed_password.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
            && self.birthdate.is_none()
    }
}
