pub mod film;
pub mod series;
pub mod user;

pub use film::{Episode, EpisodeKey, Film, FilmContent, FilmPatch, Movie};
pub use series::{Series, SeriesPatch};
pub use user::{User, UserPatch};

/// One page of a listing together with the unpaginated total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Paged<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }
}
