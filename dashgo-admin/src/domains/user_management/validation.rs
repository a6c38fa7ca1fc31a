//! Declarative rule set for the create-user form
//!
//! A [`Schema`] maps each [`Field`] to an ordered list of [`Rule`]s. Fields
//! are checked independently and every failing field is reported; within a
//! field the first failing rule wins, so `Required` shadows the format and
//! length checks that follow it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use dashgo_model::prelude::{CreateUserRequest, NewUser};
use thiserror::Error;
use zeroize::Zeroizing;

use super::form::{Field, FormValues};

/// Minimum password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$",
    )
    .expect("EMAIL_REGEX is a valid regex pattern")
});

/// Why a single field failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    #[error("required")]
    Required,
    #[error("invalid format")]
    InvalidFormat,
    #[error("shorter than {min} characters")]
    TooShort { min: usize },
    #[error("does not match {other}")]
    Mismatch { other: Field },
    /// Reported by the server after submission
    #[error("{0}")]
    Server(String),
}

/// A failing field together with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub kind: ValidationErrorKind,
}

impl FieldError {
    pub fn new(field: Field, kind: ValidationErrorKind) -> Self {
        Self { field, kind }
    }

    /// Human-readable message shown next to the input
    pub fn message(&self) -> String {
        let label = self.field.label();
        match (&self.kind, self.field) {
            (ValidationErrorKind::Required, _) => format!("{label} is required"),
            (ValidationErrorKind::InvalidFormat, Field::Email) => {
                "Invalid e-mail".to_string()
            }
            (ValidationErrorKind::InvalidFormat, _) => format!("{label} is invalid"),
            (ValidationErrorKind::TooShort { min }, _) => {
                format!("{label} must be at least {min} characters")
            }
            (
                ValidationErrorKind::Mismatch {
                    other: Field::Password,
                },
                Field::PasswordConfirmation,
            ) => "Passwords must match".to_string(),
            (ValidationErrorKind::Mismatch { other }, _) => {
                format!("{label} must match {}", other.label())
            }
            (ValidationErrorKind::Server(message), _) => message.clone(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Errors keyed by field; a field without an entry is valid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, error: FieldError) {
        self.0.insert(error.field, error);
    }

    pub fn remove(&mut self, field: Field) -> Option<FieldError> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.0.get(&field)
    }

    pub fn kind(&self, field: Field) -> Option<&ValidationErrorKind> {
        self.get(field).map(|error| &error.kind)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    /// Errors in field declaration order
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.values()
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        let mut errors = FieldErrors::new();
        for error in iter {
            errors.insert(error);
        }
        errors
    }
}

/// A single predicate applied to a field's (normalized) value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required,
    /// Syntactic e-mail check; empty values are left to `Required`
    Email,
    /// Minimum length in characters
    MinLength(usize),
    /// Value must equal another field's value
    Matches(Field),
}

impl Rule {
    fn check(&self, value: &str, values: &FormValues) -> Result<(), ValidationErrorKind> {
        match self {
            Rule::Required if value.is_empty() => Err(ValidationErrorKind::Required),
            Rule::Email if !value.is_empty() && !EMAIL_REGEX.is_match(value) => {
                Err(ValidationErrorKind::InvalidFormat)
            }
            Rule::MinLength(min) if value.chars().count() < *min => {
                Err(ValidationErrorKind::TooShort { min: *min })
            }
            Rule::Matches(other) if value != values.normalized(*other) => {
                Err(ValidationErrorKind::Mismatch { other: *other })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
struct FieldRules {
    field: Field,
    rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldRules>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules for `field`; later calls for the same field extend it
    pub fn field(mut self, field: Field, rules: impl IntoIterator<Item = Rule>) -> Self {
        match self.fields.iter_mut().find(|entry| entry.field == field) {
            Some(entry) => entry.rules.extend(rules),
            None => self.fields.push(FieldRules {
                field,
                rules: rules.into_iter().collect(),
            }),
        }
        self
    }

    /// Rules for the create-user screen
    pub fn create_user() -> Self {
        Self::new()
            .field(Field::Name, [Rule::Required])
            .field(Field::Email, [Rule::Required, Rule::Email])
            .field(
                Field::Password,
                [Rule::Required, Rule::MinLength(MIN_PASSWORD_LENGTH)],
            )
            .field(
                Field::PasswordConfirmation,
                [Rule::Matches(Field::Password)],
            )
    }

    pub fn rules(&self, field: Field) -> &[Rule] {
        self.fields
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| entry.rules.as_slice())
            .unwrap_or_default()
    }

    /// Fields whose rules read `field`, and so need re-checking when it changes
    pub fn dependents(&self, field: Field) -> Vec<Field> {
        self.fields
            .iter()
            .filter(|entry| {
                entry
                    .rules
                    .iter()
                    .any(|rule| matches!(rule, Rule::Matches(other) if *other == field))
            })
            .map(|entry| entry.field)
            .collect()
    }

    /// First failing rule for `field`, if any
    pub fn validate_field(&self, field: Field, values: &FormValues) -> Option<FieldError> {
        let value = values.normalized(field);
        self.rules(field)
            .iter()
            .find_map(|rule| rule.check(value, values).err())
            .map(|kind| FieldError::new(field, kind))
    }

    /// Check every field; all failures are collected
    pub fn validate(&self, values: &FormValues) -> Result<CreateUserPayload, FieldErrors> {
        let errors: FieldErrors = self
            .fields
            .iter()
            .filter_map(|entry| self.validate_field(entry.field, values))
            .collect();

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CreateUserPayload {
            name: values.normalized(Field::Name).to_string(),
            email: values.normalized(Field::Email).to_string(),
            password: Zeroizing::new(values.get(Field::Password).to_string()),
            password_confirmation: Zeroizing::new(
                values.get(Field::PasswordConfirmation).to_string(),
            ),
        })
    }
}

/// Validated, normalized form contents
#[derive(Clone, PartialEq, Eq)]
pub struct CreateUserPayload {
    pub name: String,
    pub email: String,
    pub password: Zeroizing<String>,
    pub password_confirmation: Zeroizing<String>,
}

impl CreateUserPayload {
    /// Stamp the payload and wrap it in the wire envelope
    pub fn into_request(self, created_at: DateTime<Utc>) -> CreateUserRequest {
        CreateUserRequest::new(NewUser {
            name: self.name,
            email: self.email,
            password: self.password,
            password_confirmation: self.password_confirmation,
            created_at,
        })
    }
}

impl fmt::Debug for CreateUserPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserPayload")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password_confirmation", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(name: &str, email: &str, password: &str, confirmation: &str) -> FormValues {
        let mut values = FormValues::default();
        values.set(Field::Name, name);
        values.set(Field::Email, email);
        values.set(Field::Password, password);
        values.set(Field::PasswordConfirmation, confirmation);
        values
    }

    #[test]
    fn valid_values_produce_normalized_payload() {
        let payload = Schema::create_user()
            .validate(&values("  Ada Lovelace ", " ada@example.com", "abcdef", "abcdef"))
            .unwrap();
        assert_eq!(payload.name, "Ada Lovelace");
        assert_eq!(payload.email, "ada@example.com");
        assert_eq!(payload.password.as_str(), "abcdef");
    }

    #[test]
    fn missing_name_is_required_regardless_of_other_fields() {
        for other in [
            values("", "a@b.com", "abcdef", "abcdef"),
            values("", "", "", ""),
            values("", "nope", "abc", "xyz"),
            values("   ", "a@b.com", "abcdef", "abcdef"),
        ] {
            let errors = Schema::create_user().validate(&other).unwrap_err();
            assert_eq!(errors.kind(Field::Name), Some(&ValidationErrorKind::Required));
        }
    }

    #[test]
    fn short_password_is_too_short() {
        let errors = Schema::create_user()
            .validate(&values("A", "a@b.com", "abc12", "abc12"))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.kind(Field::Password),
            Some(&ValidationErrorKind::TooShort { min: 6 })
        );
    }

    #[test]
    fn differing_confirmation_is_mismatch() {
        let errors = Schema::create_user()
            .validate(&values("A", "a@b.com", "abcdef", "xyz"))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.kind(Field::PasswordConfirmation),
            Some(&ValidationErrorKind::Mismatch {
                other: Field::Password
            })
        );
        assert_eq!(
            errors.get(Field::PasswordConfirmation).unwrap().message(),
            "Passwords must match"
        );
    }

    #[test]
    fn all_failures_are_reported_together() {
        let errors = Schema::create_user()
            .validate(&values("", "not-an-email", "abc", "abd"))
            .unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.kind(Field::Email), Some(&ValidationErrorKind::InvalidFormat));
    }

    #[test]
    fn required_shadows_later_rules() {
        let errors = Schema::create_user()
            .validate(&values("A", "", "", ""))
            .unwrap_err();
        assert_eq!(errors.kind(Field::Email), Some(&ValidationErrorKind::Required));
        assert_eq!(errors.kind(Field::Password), Some(&ValidationErrorKind::Required));
        // both passwords empty, so they still match
        assert!(!errors.contains(Field::PasswordConfirmation));
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        let schema = Schema::create_user();
        let ok = values("A", "a@b.com", "ñññççç", "ñññççç");
        assert!(schema.validate(&ok).is_ok());
    }

    #[test]
    fn email_syntax() {
        let schema = Schema::create_user();
        for good in ["a@b.com", "user+tag@mail.example.org", "First.Last@EXAMPLE.io"] {
            assert!(
                schema
                    .validate_field(Field::Email, &values("A", good, "", ""))
                    .is_none(),
                "{good} should be accepted"
            );
        }
        for bad in ["plain", "@example.com", "user@", "a@b", "a b@c.com", "a@@b.com"] {
            assert_eq!(
                schema
                    .validate_field(Field::Email, &values("A", bad, "", ""))
                    .map(|e| e.kind),
                Some(ValidationErrorKind::InvalidFormat),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn confirmation_depends_on_password() {
        let schema = Schema::create_user();
        assert_eq!(schema.dependents(Field::Password), vec![Field::PasswordConfirmation]);
        assert!(schema.dependents(Field::Name).is_empty());
    }

    #[test]
    fn messages_read_naturally() {
        let cases = [
            (Field::Name, ValidationErrorKind::Required, "Name is required"),
            (Field::Email, ValidationErrorKind::Required, "E-mail is required"),
            (Field::Email, ValidationErrorKind::InvalidFormat, "Invalid e-mail"),
            (
                Field::Password,
                ValidationErrorKind::TooShort { min: 6 },
                "Password must be at least 6 characters",
            ),
        ];
        for (field, kind, expected) in cases {
            assert_eq!(FieldError::new(field, kind).to_string(), expected);
        }
    }

    #[test]
    fn payload_debug_hides_passwords() {
        let payload = Schema::create_user()
            .validate(&values("A", "a@b.com", "sekrit-pass", "sekrit-pass"))
            .unwrap();
        assert!(!format!("{payload:?}").contains("sekrit"));
    }
}
