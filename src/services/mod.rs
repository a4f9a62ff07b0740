pub mod error;
pub use error::ServiceError;

pub mod hasher;
pub use hasher::{Argon2Hasher, HashError, Hasher};

pub mod token;
pub use token::{JwtTokenService, TokenError, TokenKind, TokenPayload, TokenService};

pub mod search;
pub use search::{DisabledSearch, ElasticSearch, SearchError, SearchService};

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{
    EmailUpdateRequest, LoginRequest, PasswordUpdateRequest, TokenPair, UserCreateRequest,
    UserDeleteRequest, UserService, UserUpdateRequest,
};
pub use user_service_impl::SeaOrmUserService;

pub mod series_service;
pub mod series_service_impl;
pub use series_service::{InvalidationRequest, SeriesCreateRequest, SeriesService};
pub use series_service_impl::SeaOrmSeriesService;

pub mod movie_service;
pub mod movie_service_impl;
pub use movie_service::MovieService;
pub use movie_service_impl::SeaOrmMovieService;

pub mod episode_service;
pub mod episode_service_impl;
pub use episode_service::EpisodeService;
pub use episode_service_impl::SeaOrmEpisodeService;
