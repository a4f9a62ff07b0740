//! Error kinds surfaced by the application services.

use thiserror::Error;

use super::hasher::HashError;
use super::search::SearchError;
use super::token::TokenError;
use crate::db::RepoError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found")]
    NotFound,

    #[error("Email already used")]
    EmailAlreadyUsed,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Token invalid")]
    TokenInvalid,

    #[error("New password is the same as the current password")]
    SameNewPassword,

    #[error("Search is not enabled")]
    SearchDisabled,

    #[error("Database error: {0}")]
    Database(RepoError),

    #[error("Hashing error: {0}")]
    Hash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Search error: {0}")]
    Search(String),
}

/// `NoRecord` is the only storage condition with a domain meaning.
impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NoRecord => Self::NotFound,
            other => Self::Database(other),
        }
    }
}

impl From<HashError> for ServiceError {
    fn from(err: HashError) -> Self {
        match err {
            HashError::Mismatch => Self::IncorrectPassword,
            other => Self::Hash(other.to_string()),
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => Self::TokenInvalid,
            other => Self::Token(other.to_string()),
        }
    }
}

impl From<SearchError> for ServiceError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Disabled => Self::SearchDisabled,
            other => Self::Search(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_record_becomes_not_found() {
        let err = ServiceError::from(RepoError::NoRecord);
        assert!(matches!(err, ServiceError::NotFound));
    }

    #[test]
    fn test_other_storage_errors_pass_through() {
        let err = ServiceError::from(RepoError::MalformedRow("film 1".to_string()));
        assert!(matches!(
            err,
            ServiceError::Database(RepoError::MalformedRow(_))
        ));
    }

    #[test]
    fn test_hash_mismatch_is_incorrect_password() {
        let err = ServiceError::from(HashError::Mismatch);
        assert!(matches!(err, ServiceError::IncorrectPassword));
    }
}
