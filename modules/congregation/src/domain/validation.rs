//! Input checks applied before anything reaches storage.
//!
//! Lengths are counted in characters. Name fields come back normalised, so
//! callers persist the returned values rather than their input.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidateEmail;

use crate::contract::model::{NewEvent, NewUser, UserPatch};
use crate::domain::error::DomainError;

/// Optional `+`, optional `1`, then 9 to 15 digits.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?1?\d{9,15}$").expect("valid phone regex"));

pub const NAME_MAX: usize = 50;
pub const ADDRESS_MAX: usize = 200;
pub const ADDRESS2_MAX: usize = 100;
pub const CITY_MAX: usize = 100;
pub const STATE_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 50;
pub const EVENT_TITLE_MAX: usize = 100;
pub const EVENT_DESCRIPTION_MAX: usize = 500;
pub const EVENT_LOCATION_MAX: usize = 200;

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len < min {
        return Err(DomainError::validation(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    if len > max {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max} characters (got {len})"),
        ));
    }
    Ok(())
}

/// Upper-case the first letter of each word and lower-case the rest.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_is_letter = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// First/last name: 1..=50 chars of letters and whitespace with at least one
/// letter. Returns the title-cased value.
pub fn normalize_name(field: &str, value: &str) -> Result<String, DomainError> {
    check_length(field, value, 1, NAME_MAX)?;
    if !value.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return Err(DomainError::validation(
            field,
            "must contain only letters and spaces",
        ));
    }
    if !value.chars().any(char::is_alphabetic) {
        return Err(DomainError::validation(field, "must contain a letter"));
    }
    Ok(title_case(value))
}

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    if !email.validate_email() {
        return Err(DomainError::validation(
            "email",
            format!("'{email}' is not a valid email address"),
        ));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), DomainError> {
    if !PHONE_RE.is_match(phone) {
        return Err(DomainError::validation(
            "phone_number",
            "must be an optional '+', an optional '1', then 9 to 15 digits",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    check_length("password", password, PASSWORD_MIN, PASSWORD_MAX)
}

fn validate_optional(
    field: &str,
    value: Option<&str>,
    min: usize,
    max: usize,
) -> Result<(), DomainError> {
    match value {
        Some(v) => check_length(field, v, min, max),
        None => Ok(()),
    }
}

fn validate_address_fields(
    address: Option<&str>,
    address2: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
) -> Result<(), DomainError> {
    validate_optional("address", address, 1, ADDRESS_MAX)?;
    validate_optional("address2", address2, 1, ADDRESS2_MAX)?;
    validate_optional("city", city, 1, CITY_MAX)?;
    validate_optional("state", state, 1, STATE_MAX)
}

/// Validate a creation payload and return it with normalised names.
pub fn validate_new_user(mut new_user: NewUser) -> Result<NewUser, DomainError> {
    validate_email(&new_user.email)?;
    new_user.first_name = normalize_name("first_name", &new_user.first_name)?;
    new_user.last_name = normalize_name("last_name", &new_user.last_name)?;
    if let Some(phone) = &new_user.phone_number {
        validate_phone(phone)?;
    }
    validate_address_fields(
        new_user.address.as_deref(),
        new_user.address2.as_deref(),
        new_user.city.as_deref(),
        new_user.state.as_deref(),
    )?;
    validate_password(&new_user.password)?;
    Ok(new_user)
}

/// Same checks as creation, applied only to the fields present in the patch.
/// Cleared (`Some(None)`) fields need no check.
pub fn validate_user_patch(mut patch: UserPatch) -> Result<UserPatch, DomainError> {
    if let Some(email) = &patch.email {
        validate_email(email)?;
    }
    if let Some(first) = patch.first_name.take() {
        patch.first_name = Some(normalize_name("first_name", &first)?);
    }
    if let Some(last) = patch.last_name.take() {
        patch.last_name = Some(normalize_name("last_name", &last)?);
    }
    if let Some(Some(phone)) = &patch.phone_number {
        validate_phone(phone)?;
    }
    validate_address_fields(
        patch.address.as_ref().and_then(|v| v.as_deref()),
        patch.address2.as_ref().and_then(|v| v.as_deref()),
        patch.city.as_ref().and_then(|v| v.as_deref()),
        patch.state.as_ref().and_then(|v| v.as_deref()),
    )?;
    Ok(patch)
}

pub fn validate_new_event(new_event: &NewEvent) -> Result<(), DomainError> {
    check_length("title", &new_event.title, 1, EVENT_TITLE_MAX)?;
    validate_optional(
        "description",
        new_event.description.as_deref(),
        0,
        EVENT_DESCRIPTION_MAX,
    )?;
    validate_optional("location", new_event.location.as_deref(), 0, EVENT_LOCATION_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::UserRole;
    use chrono::Utc;

    fn field_of(err: DomainError) -> String {
        match err {
            DomainError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn new_user() -> NewUser {
        NewUser {
            email: "john.doe@example.com".into(),
            first_name: "john".into(),
            last_name: "DOE".into(),
            phone_number: Some("+1234567890".into()),
            address: Some("123 Main Street".into()),
            address2: Some("Apt 4B".into()),
            city: Some("New York".into()),
            state: Some("NY".into()),
            role: UserRole::Member,
            date_of_birth: None,
            password: "securepassword123".into(),
        }
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("mary ann"), "Mary Ann");
        assert_eq!(title_case("mcDONALD"), "Mcdonald");
        assert_eq!(title_case("  jean   luc "), "  Jean   Luc ");
        assert_eq!(title_case("élodie"), "Élodie");
    }

    #[test]
    fn names_are_normalised() {
        assert_eq!(normalize_name("first_name", "mary ann").unwrap(), "Mary Ann");
        assert_eq!(normalize_name("last_name", "O").unwrap(), "O");
    }

    #[test]
    fn names_reject_digits_punctuation_and_blank() {
        assert_eq!(field_of(normalize_name("first_name", "J0hn").unwrap_err()), "first_name");
        assert!(normalize_name("last_name", "O'Brien").is_err());
        assert!(normalize_name("last_name", "").is_err());
        assert!(normalize_name("last_name", "   ").is_err());
        assert!(normalize_name("last_name", &"a".repeat(51)).is_err());
        assert!(normalize_name("last_name", &"a".repeat(50)).is_ok());
    }

    #[test]
    fn phone_pattern() {
        for ok in ["+1234567890", "123456789", "1123456789012345", "+112345678901234"] {
            assert!(validate_phone(ok).is_ok(), "{ok} should pass");
        }
        for bad in ["12345678", "+12-345-678", "phone", "+", "1234567890123456789"] {
            assert!(validate_phone(bad).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn email_format() {
        assert!(validate_email("a@b.co").is_ok());
        assert_eq!(field_of(validate_email("not-an-email").unwrap_err()), "email");
        assert!(validate_email("").is_err());
    }

    #[test]
    fn new_user_is_normalised_and_checked() {
        let u = validate_new_user(new_user()).unwrap();
        assert_eq!(u.first_name, "John");
        assert_eq!(u.last_name, "Doe");

        let mut short_pw = new_user();
        short_pw.password = "short".into();
        assert_eq!(field_of(validate_new_user(short_pw).unwrap_err()), "password");

        let mut long_pw = new_user();
        long_pw.password = "p".repeat(51);
        assert_eq!(field_of(validate_new_user(long_pw).unwrap_err()), "password");

        let mut empty_city = new_user();
        empty_city.city = Some(String::new());
        assert_eq!(field_of(validate_new_user(empty_city).unwrap_err()), "city");

        let mut long_state = new_user();
        long_state.state = Some("s".repeat(51));
        assert_eq!(field_of(validate_new_user(long_state).unwrap_err()), "state");
    }

    #[test]
    fn patch_checks_only_present_fields() {
        assert!(validate_user_patch(UserPatch::default()).is_ok());

        let patch = UserPatch {
            first_name: Some("anna maria".into()),
            phone_number: Some(None),
            city: Some(None),
            ..Default::default()
        };
        let patch = validate_user_patch(patch).unwrap();
        assert_eq!(patch.first_name.as_deref(), Some("Anna Maria"));
        assert_eq!(patch.phone_number, Some(None));

        let bad = UserPatch {
            phone_number: Some(Some("12".into())),
            ..Default::default()
        };
        assert_eq!(field_of(validate_user_patch(bad).unwrap_err()), "phone_number");

        let bad = UserPatch {
            address2: Some(Some("x".repeat(101))),
            ..Default::default()
        };
        assert_eq!(field_of(validate_user_patch(bad).unwrap_err()), "address2");
    }

    #[test]
    fn event_bounds() {
        let ok = NewEvent {
            title: "Sunday Service".into(),
            description: Some(String::new()),
            event_date: Utc::now(),
            location: None,
        };
        assert!(validate_new_event(&ok).is_ok());

        let mut e = ok.clone();
        e.title = String::new();
        assert_eq!(field_of(validate_new_event(&e).unwrap_err()), "title");

        let mut e = ok.clone();
        e.title = "t".repeat(101);
        assert!(validate_new_event(&e).is_err());

        let mut e = ok.clone();
        e.description = Some("d".repeat(501));
        assert_eq!(field_of(validate_new_event(&e).unwrap_err()), "description");

        let mut e = ok;
        e.location = Some("l".repeat(201));
        assert_eq!(field_of(validate_new_event(&e).unwrap_err()), "location");
    }
}
