use crate::utils::error::{Result, TourError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> TourError {
    TourError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// A `forRoot` endpoint: an absolute http(s) URL the feature module talks to.
pub fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    if endpoint.is_empty() {
        return Err(invalid(field, endpoint, "endpoint is empty; leave the key out instead"));
    }

    let url = Url::parse(endpoint)
        .map_err(|e| invalid(field, endpoint, format!("endpoint is not an absolute URL ({})", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field,
            endpoint,
            format!("endpoint must use http or https, not {}", scheme),
        )),
    }
}

pub fn validate_at_least(field: &str, value: usize, min: usize) -> Result<()> {
    if value < min {
        return Err(invalid(field, value, format!("must be at least {}", min)));
    }
    Ok(())
}

/// Module and declarable names are class names, so they cannot be blank
/// or contain whitespace.
pub fn validate_class_name(field: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(invalid(field, name, "name is blank"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid(field, name, "a class name cannot contain whitespace"));
    }
    Ok(())
}

pub fn validate_title(field: &str, title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(invalid(field, title, "title is blank"));
    }
    Ok(())
}
