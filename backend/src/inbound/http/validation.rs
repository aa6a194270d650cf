//! Shared validation helpers for inbound HTTP adapters.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_uuid(value: String, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(&value).map_err(|_| invalid_uuid_error(field, &value))
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be an RFC 3339 timestamp"))
        .with_value(ErrorCode::InvalidTimestamp, value)
}

pub(crate) fn parse_rfc3339_timestamp(
    value: String,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| invalid_timestamp_error(field, &value))
}

/// Map a domain validation failure onto an `invalid_request` error carrying
/// the offending field.
pub(crate) fn field_validation_error(field: FieldName, error: impl std::fmt::Display) -> Error {
    let field = field.as_str();
    ValidationError::new(field, error.to_string()).with_code(ErrorCode::InvalidValue)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;
    use serde_json::Value;

    use super::*;

    fn detail(error: &Error, key: &str) -> Option<String> {
        error
            .details()
            .and_then(|details| details.get(key))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
    }

    #[rstest]
    fn missing_field_errors_carry_the_field_name() {
        let error = missing_field_error(FieldName::new("scheduledAt"));
        assert_eq!(detail(&error, "field").as_deref(), Some("scheduledAt"));
        assert_eq!(detail(&error, "code").as_deref(), Some("missing_field"));
    }

    #[rstest]
    fn uuid_parsing_reports_the_offending_value() {
        let error =
            parse_uuid("not-a-uuid".to_owned(), FieldName::new("eventId")).expect_err("must fail");
        assert_eq!(detail(&error, "value").as_deref(), Some("not-a-uuid"));
    }

    #[rstest]
    fn timestamp_parsing_accepts_rfc3339() {
        let parsed = parse_rfc3339_timestamp(
            "2025-06-01T18:00:00Z".to_owned(),
            FieldName::new("scheduledAt"),
        )
        .expect("valid timestamp");
        assert_eq!(parsed.timestamp(), 1_748_800_800);
    }

    #[rstest]
    fn timestamp_parsing_rejects_other_formats() {
        let error = parse_rfc3339_timestamp(
            "01/06/2025 18:00".to_owned(),
            FieldName::new("scheduledAt"),
        )
        .expect_err("must fail");
        assert_eq!(detail(&error, "code").as_deref(), Some("invalid_timestamp"));
    }
}
