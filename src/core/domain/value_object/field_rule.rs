use crate::core::domain::error::ValidationError;
use std::net::IpAddr;

/// A client-side check applied to one form field before anything is staged.
///
/// Every rule except [`FieldRule::Required`] accepts an empty value, so
/// optional fields only get checked once the administrator fills them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    Email,
    Url,
    Ip,
    Numeric,
    Tel,
}

impl FieldRule {
    /// Checks `value` for `field`.
    pub fn check(&self, field: &str, value: Option<&str>) -> Result<(), ValidationError> {
        let value = value.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return match self {
                FieldRule::Required => Err(field_error(field, "This field is required")),
                _ => Ok(()),
            };
        }

        let valid = match self {
            FieldRule::Required => true,
            FieldRule::Email => is_email(value),
            FieldRule::Url => is_url(value),
            FieldRule::Ip => value.parse::<IpAddr>().is_ok(),
            FieldRule::Numeric => value.chars().all(|c| c.is_ascii_digit()),
            FieldRule::Tel => is_tel(value),
        };

        if valid {
            Ok(())
        } else {
            Err(field_error(field, self.message()))
        }
    }

    fn message(&self) -> &'static str {
        match self {
            FieldRule::Required => "This field is required",
            FieldRule::Email => "Invalid email address",
            FieldRule::Url => "Invalid URL",
            FieldRule::Ip => "Invalid IP address",
            FieldRule::Numeric => "Only digits are allowed",
            FieldRule::Tel => "Invalid phone number",
        }
    }
}

fn field_error(field: &str, message: &str) -> ValidationError {
    ValidationError::Field {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

fn is_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| u.has_host() || u.scheme() == "file")
        .unwrap_or(false)
}

// Digits with optional leading '+' and the usual separators.
fn is_tel(value: &str) -> bool {
    let body = value.strip_prefix('+').unwrap_or(value);
    let digits = body.chars().filter(char::is_ascii_digit).count();
    digits >= 3
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '.'))
}
