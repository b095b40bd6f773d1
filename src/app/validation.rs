//! Explicit constraint checks for the two request shapes.
//!
//! Violations are collected in field order `id`, `name`, `birthdate`.

use chrono::NaiveDate;

use super::resource::UserPayload;
use crate::{
    domain::entity::{NewUser, User},
    error::resource::{ValidationError, ValidationErrorKind, ValidationFieldError},
    message::key,
};

const RESOURCE: &str = "user";

fn check_id(id: Option<i64>, errors: &mut Vec<ValidationFieldError>) -> Option<i64> {
    match id {
        Some(id) if id >= 1 => Some(id),
        Some(id) => {
            errors.push(ValidationFieldError::new(
                "/id",
                Some(id.to_string()),
                key::ID_MINSIZE,
                vec![ValidationErrorKind::Minimum(1)],
            ));
            None
        }
        None => {
            errors.push(ValidationFieldError::new(
                "/id",
                None,
                key::ID_MINSIZE,
                vec![ValidationErrorKind::Required],
            ));
            None
        }
    }
}

fn check_name(name: Option<String>, errors: &mut Vec<ValidationFieldError>) -> Option<String> {
    match name {
        Some(name) if !name.is_empty() => Some(name),
        Some(name) => {
            errors.push(ValidationFieldError::new(
                "/name",
                Some(name),
                key::NAME_NOTNULL,
                vec![ValidationErrorKind::MinLength(1)],
            ));
            None
        }
        None => {
            errors.push(ValidationFieldError::new(
                "/name",
                None,
                key::NAME_NOTNULL,
                vec![ValidationErrorKind::Required],
            ));
            None
        }
    }
}

fn check_birthdate(
    birthdate: Option<NaiveDate>,
    errors: &mut Vec<ValidationFieldError>,
) -> Option<NaiveDate> {
    if birthdate.is_none() {
        errors.push(ValidationFieldError::new(
            "/birthdate",
            None,
            key::BIRTHDATE_NOTNULL,
            vec![ValidationErrorKind::Required],
        ));
    }
    birthdate
}

/// Requires `name` and `birthdate`, any `id` sent is ignored.
pub fn validate_for_create(payload: UserPayload) -> Result<NewUser, ValidationError> {
    let mut errors = Vec::new();
    let name = check_name(payload.name, &mut errors);
    let birthdate = check_birthdate(payload.birthdate, &mut errors);

    match (name, birthdate) {
        (Some(name), Some(birthdate)) if errors.is_empty() => Ok(NewUser { name, birthdate }),
        _ => Err(ValidationError::new(RESOURCE, errors)),
    }
}

/// Requires `id`, `name` and `birthdate`.
pub fn validate_for_update(payload: UserPayload) -> Result<User, ValidationError> {
    let mut errors = Vec::new();
    let id = check_id(payload.id, &mut errors);
    let name = check_name(payload.name, &mut errors);
    let birthdate = check_birthdate(payload.birthdate, &mut errors);

    match (id, name, birthdate) {
        (Some(id), Some(name), Some(birthdate)) if errors.is_empty() => {
            Ok(User::new(id, name, birthdate))
        }
        _ => Err(ValidationError::new(RESOURCE, errors)),
    }
}
