//! Client-side validation rules.
//!
//! Lengths are counted in Unicode scalar values, matching what a user sees
//! in a form field rather than UTF-8 byte length.

use crate::error::ValidationError;

pub const TITLE_MIN: usize = 1;
pub const TITLE_MAX: usize = 20;
pub const URL_MIN: usize = 1;
pub const URL_MAX: usize = 1024;
pub const BIO_MAX: usize = 80;
pub const DISPLAY_NAME_MIN: usize = 1;
pub const DISPLAY_NAME_MAX: usize = 50;
pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 25;
pub const SOCIAL_HANDLE_MAX: usize = 256;
pub const COLOR_MAX: usize = 64;

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let actual = char_len(title);
    if !(TITLE_MIN..=TITLE_MAX).contains(&actual) {
        return Err(ValidationError::TitleLength {
            min: TITLE_MIN,
            max: TITLE_MAX,
            actual,
        });
    }
    Ok(())
}

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    let actual = char_len(url);
    if !(URL_MIN..=URL_MAX).contains(&actual) {
        return Err(ValidationError::UrlLength {
            min: URL_MIN,
            max: URL_MAX,
            actual,
        });
    }
    Ok(())
}

pub fn validate_bio(bio: &str) -> Result<(), ValidationError> {
    let actual = char_len(bio);
    if actual > BIO_MAX {
        return Err(ValidationError::BioTooLong {
            max: BIO_MAX,
            actual,
        });
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let actual = char_len(name);
    if !(DISPLAY_NAME_MIN..=DISPLAY_NAME_MAX).contains(&actual) {
        return Err(ValidationError::DisplayNameLength {
            min: DISPLAY_NAME_MIN,
            max: DISPLAY_NAME_MAX,
            actual,
        });
    }
    Ok(())
}

/// Usernames form the public address, so they are restricted to ASCII
/// letters, digits, `_`, `-` and `.`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let actual = char_len(username);
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&actual) {
        return Err(ValidationError::UsernameLength {
            min: USERNAME_MIN,
            max: USERNAME_MAX,
            actual,
        });
    }
    if let Some(c) = username
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(ValidationError::UsernameCharacter(c));
    }
    Ok(())
}

pub fn validate_social_handle(handle: &str) -> Result<(), ValidationError> {
    let actual = char_len(handle);
    if actual > SOCIAL_HANDLE_MAX {
        return Err(ValidationError::SocialHandleTooLong {
            max: SOCIAL_HANDLE_MAX,
            actual,
        });
    }
    Ok(())
}

pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    let actual = char_len(color);
    if actual > COLOR_MAX {
        return Err(ValidationError::ColorTooLong {
            max: COLOR_MAX,
            actual,
        });
    }
    Ok(())
}

/// Trim `value` and map an empty result to `None`.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
