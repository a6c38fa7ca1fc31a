//! Create-user form state
//!
//! Holds the raw input values, the per-field errors currently shown and the
//! submission lifecycle. Validation runs on submit; once the user has tried
//! to submit, every change re-checks the edited field and the fields whose
//! rules read it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use thiserror::Error;
use zeroize::Zeroizing;

use super::validation::{
    CreateUserPayload, FieldError, FieldErrors, Schema, ValidationErrorKind,
};
use crate::infrastructure::api_client::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    PasswordConfirmation,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Name,
        Field::Email,
        Field::Password,
        Field::PasswordConfirmation,
    ];

    /// Name used in request bodies and server error maps
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::PasswordConfirmation => "password_confirmation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "E-mail",
            Field::Password => "Password",
            Field::PasswordConfirmation => "Password confirmation",
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Field::Password | Field::PasswordConfirmation)
    }

    /// Name and e-mail are compared and submitted without surrounding
    /// whitespace; passwords are taken verbatim
    fn is_trimmed(&self) -> bool {
        matches!(self, Field::Name | Field::Email)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Raw input values, exactly as typed
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    name: String,
    email: String,
    password: Zeroizing<String>,
    password_confirmation: Zeroizing<String>,
}

impl FormValues {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Password => self.password.as_str(),
            Field::PasswordConfirmation => self.password_confirmation.as_str(),
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Password => self.password = Zeroizing::new(value),
            Field::PasswordConfirmation => {
                self.password_confirmation = Zeroizing::new(value)
            }
        }
    }

    /// Value as the rules see it
    pub fn normalized(&self, field: Field) -> &str {
        let value = self.get(field);
        if field.is_trimmed() { value.trim() } else { value }
    }
}

impl fmt::Debug for FormValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormValues")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password_confirmation", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Why the submission collaborator did not create the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The server refused specific fields
    #[error("{message}")]
    Rejected {
        message: String,
        field_errors: FieldErrors,
    },
    /// Network or server failure with no field attribution
    #[error("{0}")]
    Failed(String),
}

impl From<ApiError> for SubmissionError {
    fn from(error: ApiError) -> Self {
        match &error {
            ApiError::Rejected { errors } => {
                let field_errors = server_field_errors(errors);
                if field_errors.is_empty() {
                    SubmissionError::Failed(error.to_string())
                } else {
                    SubmissionError::Rejected {
                        message: error.to_string(),
                        field_errors,
                    }
                }
            }
            _ => SubmissionError::Failed(error.to_string()),
        }
    }
}

/// First message per known field; unknown keys stay in the summary only
fn server_field_errors(errors: &BTreeMap<String, Vec<String>>) -> FieldErrors {
    errors
        .iter()
        .filter_map(|(name, messages)| {
            let field = name.parse::<Field>().ok()?;
            let message = messages.first()?;
            Some(FieldError::new(
                field,
                ValidationErrorKind::Server(server_message(field, message)),
            ))
        })
        .collect()
}

/// Rails-style fragments ("has already been taken") get the field label
fn server_message(field: Field, message: &str) -> String {
    if message.starts_with(|c: char| c.is_lowercase()) {
        format!("{} {}", field.label(), message)
    } else {
        message.to_string()
    }
}

/// Result of a submit attempt, before anything is sent
#[derive(Debug)]
pub enum SubmitOutcome {
    /// A submission is already in flight; nothing changed
    AlreadySubmitting,
    /// Validation failed; errors are now on the form
    Invalid,
    /// The form is now `Submitting` and the payload should be sent
    Ready(CreateUserPayload),
}

/// Identifies one mount of the form so late results can be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormId(pub u64);

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form#{}", self.0)
    }
}

#[derive(Debug)]
pub struct CreateUserForm {
    id: FormId,
    schema: Schema,
    values: FormValues,
    errors: FieldErrors,
    status: SubmissionStatus,
    submit_count: u32,
    failure: Option<String>,
}

impl CreateUserForm {
    pub fn new(id: FormId) -> Self {
        Self::with_schema(id, Schema::create_user())
    }

    pub fn with_schema(id: FormId, schema: Schema) -> Self {
        Self {
            id,
            schema,
            values: FormValues::default(),
            errors: FieldErrors::new(),
            status: SubmissionStatus::Idle,
            submit_count: 0,
            failure: None,
        }
    }

    pub fn id(&self) -> FormId {
        self.id
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(field)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SubmissionStatus::Submitting
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    /// Message from the last failed submission
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn update_field(&mut self, field: Field, value: impl Into<String>) {
        self.values.set(field, value);

        if self.submit_count == 0 {
            return;
        }

        for field in std::iter::once(field).chain(self.schema.dependents(field)) {
            match self.schema.validate_field(field, &self.values) {
                Some(error) => self.errors.insert(error),
                None => {
                    if self.errors.remove(field).is_some() {
                        debug!("{} cleared {} error", self.id, field);
                    }
                }
            }
        }
    }

    pub fn validate(&self) -> Result<CreateUserPayload, FieldErrors> {
        self.schema.validate(&self.values)
    }

    /// Validate and, if everything passes, move to `Submitting`
    pub fn begin_submit(&mut self) -> SubmitOutcome {
        if self.is_submitting() {
            return SubmitOutcome::AlreadySubmitting;
        }

        self.submit_count += 1;

        match self.validate() {
            Ok(payload) => {
                self.errors.clear();
                self.failure = None;
                self.status = SubmissionStatus::Submitting;
                SubmitOutcome::Ready(payload)
            }
            Err(errors) => {
                self.errors = errors;
                self.status = SubmissionStatus::Idle;
                SubmitOutcome::Invalid
            }
        }
    }

    pub fn complete_submission(&mut self) {
        self.status = SubmissionStatus::Succeeded;
        self.failure = None;
    }

    pub fn fail_submission(&mut self, error: &SubmissionError) {
        self.status = SubmissionStatus::Failed;
        self.failure = Some(error.to_string());
        if let SubmissionError::Rejected { field_errors, .. } = error {
            self.errors.extend(field_errors.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(name: &str, email: &str, password: &str, confirmation: &str) -> CreateUserForm {
        let mut form = CreateUserForm::new(FormId(1));
        form.update_field(Field::Name, name);
        form.update_field(Field::Email, email);
        form.update_field(Field::Password, password);
        form.update_field(Field::PasswordConfirmation, confirmation);
        form
    }

    #[test]
    fn field_names_round_trip_through_from_str() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>(), Ok(field));
        }
        assert_eq!(
            "username".parse::<Field>(),
            Err(UnknownField("username".to_string()))
        );
    }

    #[test]
    fn no_errors_before_first_submit() {
        let form = filled("", "bad", "abc", "xyz");
        assert!(form.errors().is_empty());
        assert_eq!(form.status(), SubmissionStatus::Idle);
    }

    #[test]
    fn invalid_submit_stays_idle_with_errors() {
        let mut form = filled("", "a@b.com", "abcdef", "abcdef");
        assert!(matches!(form.begin_submit(), SubmitOutcome::Invalid));
        assert_eq!(form.status(), SubmissionStatus::Idle);
        assert_eq!(
            form.errors().kind(Field::Name),
            Some(&ValidationErrorKind::Required)
        );
    }

    #[test]
    fn errors_clear_as_fields_are_fixed_after_submit() {
        let mut form = filled("", "a@b.com", "abcdef", "abcdef");
        form.begin_submit();
        assert!(form.error(Field::Name).is_some());

        form.update_field(Field::Name, "Ada");
        assert!(form.errors().is_empty());
    }

    #[test]
    fn changing_password_rechecks_confirmation() {
        let mut form = filled("Ada", "a@b.com", "abcdef", "abcdef");
        form.begin_submit();
        form.fail_submission(&SubmissionError::Failed("offline".to_string()));

        form.update_field(Field::Password, "abcdefg");
        assert_eq!(
            form.errors().kind(Field::PasswordConfirmation),
            Some(&ValidationErrorKind::Mismatch {
                other: Field::Password
            })
        );

        form.update_field(Field::PasswordConfirmation, "abcdefg");
        assert!(form.errors().is_empty());
    }

    #[test]
    fn second_submit_while_submitting_is_ignored() {
        let mut form = filled("Ada", "a@b.com", "abcdef", "abcdef");
        assert!(matches!(form.begin_submit(), SubmitOutcome::Ready(_)));
        assert!(matches!(
            form.begin_submit(),
            SubmitOutcome::AlreadySubmitting
        ));
        assert_eq!(form.submit_count(), 1);
    }

    #[test]
    fn failure_keeps_message_and_server_field_errors() {
        let mut form = filled("Ada", "ada@example.com", "abcdef", "abcdef");
        form.begin_submit();

        let mut errors = BTreeMap::new();
        errors.insert("email".to_string(), vec!["has already been taken".to_string()]);
        errors.insert("nickname".to_string(), vec!["is odd".to_string()]);
        let error = SubmissionError::from(ApiError::Rejected { errors });
        form.fail_submission(&error);

        assert_eq!(form.status(), SubmissionStatus::Failed);
        assert_eq!(
            form.error(Field::Email).map(|e| e.message()),
            Some("E-mail has already been taken".to_string())
        );
        assert!(form.failure().unwrap().contains("nickname"));
    }

    #[test]
    fn rejection_with_only_unknown_fields_is_opaque() {
        let mut errors = BTreeMap::new();
        errors.insert("base".to_string(), vec!["Quota exceeded".to_string()]);
        assert!(matches!(
            SubmissionError::from(ApiError::Rejected { errors }),
            SubmissionError::Failed(_)
        ));
    }

    #[test]
    fn debug_output_redacts_passwords() {
        let form = filled("Ada", "a@b.com", "topsecret", "topsecret");
        assert!(!format!("{form:?}").contains("topsecret"));
    }
}
