//! Field-level validation for request payloads.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::AppError;

/// Implemented by every write payload; run before anything reaches the store.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), AppError> {
        for (i, item) in self.iter().enumerate() {
            item.validate()
                .map_err(|e| AppError::Validation(format!("data[{}]: {}", i, e)))?;
        }
        Ok(())
    }
}

fn fail(msg: String) -> Result<(), AppError> {
    Err(AppError::Validation(msg))
}

pub fn max_length(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return fail(format!("{} must be at most {} characters", field, max));
    }
    Ok(())
}

pub fn min_length(field: &str, value: &str, min: usize) -> Result<(), AppError> {
    if value.chars().count() < min {
        return fail(format!("{} must be at least {} characters", field, min));
    }
    Ok(())
}

pub fn not_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return fail(format!("{} must not be empty", field));
    }
    Ok(())
}

/// Strictly positive.
pub fn gt_zero(field: &str, value: f64) -> Result<(), AppError> {
    if !(value > 0.0) {
        return fail(format!("{} must be greater than 0", field));
    }
    Ok(())
}

pub fn ge_zero(field: &str, value: f64) -> Result<(), AppError> {
    if !(value >= 0.0) {
        return fail(format!("{} must be at least 0", field));
    }
    Ok(())
}

/// Inclusive range.
pub fn between(field: &str, value: f64, min: f64, max: f64) -> Result<(), AppError> {
    if !(min..=max).contains(&value) {
        return fail(format!("{} must be between {} and {}", field, min, max));
    }
    Ok(())
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
}

pub fn email(field: &str, value: &str) -> Result<(), AppError> {
    if !email_re().is_match(value) {
        return fail(format!("{} must be a valid email", field));
    }
    Ok(())
}
