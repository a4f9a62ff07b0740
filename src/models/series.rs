use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: i32,
    pub title: String,
    pub descriptions: Option<String>,
    pub date_started: NaiveDate,
    pub date_ended: Option<NaiveDate>,
    pub contributed_by: i32,
    pub contributed_at: DateTime<Utc>,
    pub invalidation: Option<String>,
}

impl Series {
    /// A not-yet-persisted series. Identity and contribution stamps are
    /// assigned by the repository on insert.
    #[must_use]
    pub fn new(title: impl Into<String>, date_started: NaiveDate) -> Self {
        Self {
            id: 0,
            title: title.into(),
            descriptions: None,
            date_started,
            date_ended: None,
            contributed_by: 0,
            contributed_at: Utc::now(),
            invalidation: None,
        }
    }

    #[must_use]
    pub const fn is_invalidated(&self) -> bool {
        self.invalidation.is_some()
    }
}

/// Sparse update of a series. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeriesPatch {
    pub title: Option<String>,
    pub descriptions: Option<String>,
    pub date_started: Option<NaiveDate>,
    pub date_ended: Option<NaiveDate>,
}
