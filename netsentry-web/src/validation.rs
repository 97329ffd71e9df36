use axum::http::StatusCode;
use netsentry_core::{AlertStatus, LogStatus, Severity};
use regex::Regex;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error_handling::AppError;

/// Maximum allowed length for attack type names
const MAX_ATTACK_TYPE_LENGTH: usize = 255;
/// Maximum allowed length for alert descriptions
const MAX_DESCRIPTION_LENGTH: usize = 1000;
/// Maximum allowed length for model names
const MAX_MODEL_NAME_LENGTH: usize = 255;
/// Maximum allowed length for model descriptions
const MAX_MODEL_DESCRIPTION_LENGTH: usize = 1000;
/// Maximum allowed filename length
const MAX_FILENAME_LENGTH: usize = 255;
/// Maximum allowed length for user names
const MAX_USER_NAME_LENGTH: usize = 255;

/// Allowed file extensions for network log uploads
const ALLOWED_EXTENSIONS: &[&str] = &["csv", "txt", "pcap"];

#[derive(Debug, Clone)]
pub enum ValidationError {
    AttackTypeEmpty,
    AttackTypeTooLong(usize),
    SeverityInvalid(String),
    AlertStatusInvalid(String),
    LogStatusInvalid(String),
    IpInvalid(String),
    ConfidenceOutOfRange(f64),
    DescriptionTooLong(usize),
    ModelNameEmpty,
    ModelNameTooLong(usize),
    ModelNameTaken(String),
    UserNameEmpty,
    UserNameTooLong(usize),
    EmailInvalid(String),
    FilenameEmpty,
    FilenameTooLong(usize),
    FilenameInvalid(String),
    FileExtensionNotAllowed(String),
    FileTooLarge(String),
    LimitOutOfRange(i64),
    OffsetNegative(i64),
}

impl ValidationError {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            ValidationError::FileTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE, // 413
            ValidationError::FilenameInvalid(_) => StatusCode::UNPROCESSABLE_ENTITY, // 422
            ValidationError::FileExtensionNotAllowed(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE, // 415
            _ => StatusCode::UNPROCESSABLE_ENTITY, // 422
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            ValidationError::AttackTypeEmpty => "attack_type cannot be empty".to_string(),
            ValidationError::AttackTypeTooLong(len) => {
                format!(
                    "attack_type too long: {} characters (max {})",
                    len, MAX_ATTACK_TYPE_LENGTH
                )
            }
            ValidationError::SeverityInvalid(raw) => {
                format!(
                    "severity '{}' invalid. Allowed: low, medium, high, critical",
                    raw
                )
            }
            ValidationError::AlertStatusInvalid(raw) => {
                format!(
                    "status '{}' invalid. Allowed: new, investigating, resolved, false_positive",
                    raw
                )
            }
            ValidationError::LogStatusInvalid(raw) => {
                format!(
                    "status '{}' invalid. Allowed: pending, processing, processed, failed",
                    raw
                )
            }
            ValidationError::IpInvalid(raw) => {
                format!("'{}' is not a valid IP address", raw)
            }
            ValidationError::ConfidenceOutOfRange(value) => {
                format!("confidence_score {} out of range (must be 0 to 1)", value)
            }
            ValidationError::DescriptionTooLong(len) => {
                format!(
                    "description too long: {} characters (max {})",
                    len, MAX_DESCRIPTION_LENGTH
                )
            }
            ValidationError::ModelNameEmpty => "name cannot be empty".to_string(),
            ValidationError::ModelNameTooLong(len) => {
                format!(
                    "name too long: {} characters (max {})",
                    len, MAX_MODEL_NAME_LENGTH
                )
            }
            ValidationError::ModelNameTaken(name) => {
                format!("name '{}' is already taken", name)
            }
            ValidationError::UserNameEmpty => "name cannot be empty".to_string(),
            ValidationError::UserNameTooLong(len) => {
                format!(
                    "name too long: {} characters (max {})",
                    len, MAX_USER_NAME_LENGTH
                )
            }
            ValidationError::EmailInvalid(email) => {
                format!("'{}' is not a valid email address", email)
            }
            ValidationError::FilenameEmpty => "Filename cannot be empty".to_string(),
            ValidationError::FilenameTooLong(len) => {
                format!(
                    "Filename too long: {} characters (max {})",
                    len, MAX_FILENAME_LENGTH
                )
            }
            ValidationError::FilenameInvalid(name) => {
                format!("Filename contains invalid characters: '{}'", name)
            }
            ValidationError::FileExtensionNotAllowed(ext) => {
                format!(
                    "File extension '{}' not allowed. Allowed: {}",
                    ext,
                    ALLOWED_EXTENSIONS.join(", ")
                )
            }
            ValidationError::FileTooLarge(msg) => msg.clone(),
            ValidationError::LimitOutOfRange(limit) => {
                format!("Limit {} out of range (must be 1 to 100)", limit)
            }
            ValidationError::OffsetNegative(offset) => {
                format!("Offset {} must be non-negative", offset)
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::validation(e.to_message())
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub struct Validator;

impl Validator {
    pub fn validate_attack_type(attack_type: &str) -> ValidationResult<()> {
        if attack_type.trim().is_empty() {
            return Err(ValidationError::AttackTypeEmpty);
        }
        if attack_type.len() > MAX_ATTACK_TYPE_LENGTH {
            return Err(ValidationError::AttackTypeTooLong(attack_type.len()));
        }
        Ok(())
    }

    pub fn validate_severity(severity: &str) -> ValidationResult<Severity> {
        severity
            .parse::<Severity>()
            .map_err(|_| ValidationError::SeverityInvalid(severity.to_string()))
    }

    pub fn validate_alert_status(status: &str) -> ValidationResult<AlertStatus> {
        status
            .parse::<AlertStatus>()
            .map_err(|_| ValidationError::AlertStatusInvalid(status.to_string()))
    }

    pub fn validate_log_status(status: &str) -> ValidationResult<LogStatus> {
        status
            .parse::<LogStatus>()
            .map_err(|_| ValidationError::LogStatusInvalid(status.to_string()))
    }

    pub fn validate_ip(ip: Option<&String>) -> ValidationResult<()> {
        if let Some(raw) = ip {
            IpAddr::from_str(raw).map_err(|_| ValidationError::IpInvalid(raw.clone()))?;
        }
        Ok(())
    }

    pub fn validate_confidence(score: Option<f64>) -> ValidationResult<()> {
        if let Some(value) = score {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::ConfidenceOutOfRange(value));
            }
        }
        Ok(())
    }

    pub fn validate_description(description: Option<&String>) -> ValidationResult<()> {
        if let Some(desc) = description {
            if desc.len() > MAX_DESCRIPTION_LENGTH {
                return Err(ValidationError::DescriptionTooLong(desc.len()));
            }
        }
        Ok(())
    }

    pub fn validate_model_name(name: &str) -> ValidationResult<()> {
        if name.trim().is_empty() {
            return Err(ValidationError::ModelNameEmpty);
        }
        if name.len() > MAX_MODEL_NAME_LENGTH {
            return Err(ValidationError::ModelNameTooLong(name.len()));
        }
        Ok(())
    }

    pub fn validate_model_description(description: Option<&String>) -> ValidationResult<()> {
        if let Some(desc) = description {
            if desc.len() > MAX_MODEL_DESCRIPTION_LENGTH {
                return Err(ValidationError::DescriptionTooLong(desc.len()));
            }
        }
        Ok(())
    }

    pub fn validate_user_name(name: &str) -> ValidationResult<()> {
        if name.trim().is_empty() {
            return Err(ValidationError::UserNameEmpty);
        }
        if name.len() > MAX_USER_NAME_LENGTH {
            return Err(ValidationError::UserNameTooLong(name.len()));
        }
        Ok(())
    }

    pub fn validate_email(email: &str) -> ValidationResult<()> {
        // Deliberately loose; the mail channel is external to this service.
        let pattern = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
        if !pattern.is_match(email) {
            return Err(ValidationError::EmailInvalid(email.to_string()));
        }
        Ok(())
    }

    /// Validate an uploaded file and return the sanitized filename.
    pub fn validate_file_upload(
        filename: &str,
        file_size: usize,
        max_size: usize,
    ) -> ValidationResult<String> {
        if filename.is_empty() {
            return Err(ValidationError::FilenameEmpty);
        }
        if filename.len() > MAX_FILENAME_LENGTH {
            return Err(ValidationError::FilenameTooLong(filename.len()));
        }

        // Strip any path components, then restrict the character set
        let base_name = std::path::Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");
        if base_name.is_empty() {
            return Err(ValidationError::FilenameInvalid(filename.to_string()));
        }

        let valid_chars = Regex::new(r"^[a-zA-Z0-9\s\-_.()]+$").unwrap();
        if !valid_chars.is_match(base_name) {
            return Err(ValidationError::FilenameInvalid(filename.to_string()));
        }

        let extension = std::path::Path::new(base_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ValidationError::FileExtensionNotAllowed(extension));
        }

        if file_size > max_size {
            return Err(ValidationError::FileTooLarge(format!(
                "File size ({} bytes) exceeds maximum allowed size ({} bytes)",
                file_size, max_size
            )));
        }

        Ok(base_name.to_string())
    }

    pub fn validate_pagination(
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ValidationResult<(i64, i64)> {
        let limit = limit.unwrap_or(10);
        let offset = offset.unwrap_or(0);

        if !(1..=100).contains(&limit) {
            return Err(ValidationError::LimitOutOfRange(limit));
        }
        if offset < 0 {
            return Err(ValidationError::OffsetNegative(offset));
        }

        Ok((limit, offset))
    }
}
