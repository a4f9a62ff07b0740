use chrono::NaiveDate;

use super::ApiError;
use crate::config::{LengthRange, PasswordRules, ValidationConfig};
use crate::models::{EpisodeKey, FilmContent, FilmPatch, SeriesPatch};
use crate::services::{
    EmailUpdateRequest, InvalidationRequest, LoginRequest, PasswordUpdateRequest,
    SeriesCreateRequest, UserCreateRequest, UserDeleteRequest, UserUpdateRequest,
};

const SPECIAL_CHARS: &str = "@#$%^&*_-+=(){}[]|\\:;\"'`<>.,~!?/";

pub fn validate_id(name: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::invalid_parameter(format!(
            "Invalid {name}: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_season_number(season: i32, config: &ValidationConfig) -> Result<i32, ApiError> {
    if !(1..=config.season_number_max).contains(&season) {
        return Err(ApiError::invalid_parameter(format!(
            "Invalid season number: {season}. Must be between 1 and {}",
            config.season_number_max
        )));
    }
    Ok(season)
}

pub fn validate_episode_key(
    key: EpisodeKey,
    config: &ValidationConfig,
) -> Result<EpisodeKey, ApiError> {
    validate_id("series id", key.series_id)?;
    validate_season_number(key.season_number, config)?;

    if !(1..=config.episode_number_max).contains(&key.episode_number) {
        return Err(ApiError::invalid_parameter(format!(
            "Invalid episode number: {}. Must be between 1 and {}",
            key.episode_number, config.episode_number_max
        )));
    }
    Ok(key)
}

pub fn validate_search_query<'a>(
    query: &'a str,
    config: &ValidationConfig,
) -> Result<&'a str, ApiError> {
    let trimmed = query.trim();
    check_length("query", trimmed, config.search_query)?;
    Ok(trimmed)
}

pub fn validate_invalidation(
    request: &InvalidationRequest,
    config: &ValidationConfig,
) -> Result<(), ApiError> {
    check_length("invalidation", &request.invalidation, config.invalidation)
}

pub fn validate_bulk_length(len: usize, config: &ValidationConfig) -> Result<(), ApiError> {
    if len == 0 || len > config.array_max_length {
        return Err(ApiError::validation(format!(
            "Request must contain between 1 and {} items",
            config.array_max_length
        )));
    }
    Ok(())
}

pub fn validate_user_create(
    request: &UserCreateRequest,
    config: &ValidationConfig,
) -> Result<(), ApiError> {
    check_email(&request.email, config)?;
    check_password("password", &request.password, &config.password)?;
    check_profile(
        request.first_name.as_deref(),
        request.last_name.as_deref(),
        request.bio.as_deref(),
        request.birthdate,
        config,
    )
}

pub fn validate_login(request: &LoginRequest, config: &ValidationConfig) -> Result<(), ApiError> {
    check_email(&request.email, config)?;
    check_present("password", &request.password)
}

pub fn validate_user_update(
    request: &UserUpdateRequest,
    config: &ValidationConfig,
) -> Result<(), ApiError> {
    check_profile(
        request.first_name.as_deref(),
        request.last_name.as_deref(),
        request.bio.as_deref(),
        request.birthdate,
        config,
    )
}

pub fn validate_email_update(
    request: &EmailUpdateRequest,
    config: &ValidationConfig,
) -> Result<(), ApiError> {
    check_email(&request.email, config)
}

pub fn validate_password_update(
    request: &PasswordUpdateRequest,
    config: &ValidationConfig,
) -> Result<(), ApiError> {
    check_present("current_password", &request.current_password)?;
    check_password("new_password", &request.new_password, &config.password)
}

pub fn validate_user_delete(request: &UserDeleteRequest) -> Result<(), ApiError> {
    check_present("password", &request.password)
}

pub fn validate_film_content(
    content: &FilmContent,
    config: &ValidationConfig,
) -> Result<(), ApiError> {
    check_length("title", &content.title, config.film_title)?;
    if let Some(descriptions) = &content.descriptions {
        check_length("descriptions", descriptions, config.film_descriptions)?;
    }
    check_date_min("date_released", content.date_released, config.date_released_min)?;
    if let Some(duration) = content.duration {
        check_duration(duration, config)?;
    }
    Ok(())
}

pub fn validate_film_patch(patch: &FilmPatch, config: &ValidationConfig) -> Result<(), ApiError> {
    if let Some(title) = &patch.title {
        check_length("title", title, config.film_title)?;
    }
    if let Some(descriptions) = &patch.descriptions {
        check_length("descriptions", descriptions, config.film_descriptions)?;
    }
    if let Some(date) = patch.date_released {
        check_date_min("date_released", date, config.date_released_min)?;
    }
    if let Some(duration) = patch.duration {
        check_duration(duration, config)?;
    }
    Ok(())
}

pub fn validate_series_create(
    request: &SeriesCreateRequest,
    config: &ValidationConfig,
) -> Result<(), ApiError> {
    check_series_fields(
        Some(&request.title),
        request.descriptions.as_deref(),
        Some(request.date_started),
        request.date_ended,
        config,
    )
}

pub fn validate_series_patch(
    patch: &SeriesPatch,
    config: &ValidationConfig,
) -> Result<(), ApiError> {
    check_series_fields(
        patch.title.as_deref(),
        patch.descriptions.as_deref(),
        patch.date_started,
        patch.date_ended,
        config,
    )
}

fn check_series_fields(
    title: Option<&str>,
    descriptions: Option<&str>,
    date_started: Option<NaiveDate>,
    date_ended: Option<NaiveDate>,
    config: &ValidationConfig,
) -> Result<(), ApiError> {
    if let Some(title) = title {
        check_length("title", title, config.series_title)?;
    }
    if let Some(descriptions) = descriptions {
        check_length("descriptions", descriptions, config.series_descriptions)?;
    }
    if let Some(started) = date_started {
        check_date_min("date_started", started, config.date_started_min)?;
    }
    if let Some(ended) = date_ended {
        check_date_min("date_ended", ended, config.date_ended_min)?;
    }
    if let (Some(started), Some(ended)) = (date_started, date_ended)
        && ended < started
    {
        return Err(ApiError::validation(
            "date_ended must not precede date_started",
        ));
    }
    Ok(())
}

fn check_profile(
    first_name: Option<&str>,
    last_name: Option<&str>,
    bio: Option<&str>,
    birthdate: Option<NaiveDate>,
    config: &ValidationConfig,
) -> Result<(), ApiError> {
    if let Some(first_name) = first_name {
        check_length("first_name", first_name, config.first_name)?;
    }
    if let Some(last_name) = last_name {
        check_length("last_name", last_name, config.last_name)?;
    }
    if let Some(bio) = bio {
        check_length("bio", bio, config.bio)?;
    }
    if let Some(birthdate) = birthdate {
        check_date_min("birthdate", birthdate, config.birthdate_min)?;
    }
    Ok(())
}

fn check_length(field: &str, value: &str, range: LengthRange) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < range.min || len > range.max {
        return Err(ApiError::validation(format!(
            "{field} must be between {} and {} characters",
            range.min, range.max
        )));
    }
    Ok(())
}

fn check_present(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(())
}

fn check_date_min(field: &str, value: NaiveDate, min: NaiveDate) -> Result<(), ApiError> {
    if value < min {
        return Err(ApiError::validation(format!(
            "{field} must not be earlier than {min}"
        )));
    }
    Ok(())
}

fn check_duration(duration: i32, config: &ValidationConfig) -> Result<(), ApiError> {
    if !(config.duration_min..=config.duration_max).contains(&duration) {
        return Err(ApiError::validation(format!(
            "duration must be between {} and {} minutes",
            config.duration_min, config.duration_max
        )));
    }
    Ok(())
}

fn check_email(email: &str, config: &ValidationConfig) -> Result<(), ApiError> {
    check_length("email", email, config.email)?;

    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain
                .split_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            && !email.chars().any(char::is_whitespace)
    });

    if !valid {
        return Err(ApiError::validation("email must be a valid email address"));
    }
    Ok(())
}

fn check_password(field: &str, password: &str, rules: &PasswordRules) -> Result<(), ApiError> {
    check_length(field, password, rules.length)?;

    let (mut numbers, mut lowers, mut uppers, mut specials) = (0, 0, 0, 0);
    for ch in password.chars() {
        if ch.is_ascii_digit() {
            numbers += 1;
        } else if ch.is_ascii_lowercase() {
            lowers += 1;
        } else if ch.is_ascii_uppercase() {
            uppers += 1;
        } else if SPECIAL_CHARS.contains(ch) {
            specials += 1;
        }
    }

    if numbers < rules.required_numbers
        || lowers < rules.required_lower_letters
        || uppers < rules.required_upper_letters
        || specials < rules.required_special_chars
    {
        return Err(ApiError::validation(format!(
            "{field} must contain at least {} numbers, {} lowercase letters, \
             {} uppercase letters and {} special characters",
            rules.required_numbers,
            rules.required_lower_letters,
            rules.required_upper_letters,
            rules.required_special_chars
        )));
    }
    Ok(())
}
