//! Login and register forms.
//!
//! Forms own their field text and validate it before anything is sent to the
//! session store: a form that fails validation never reaches the identity
//! service.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::auth::{AuthError, Identity, SessionStore};

// ============================================================================
// Constants
// ============================================================================

/// Longest address allowed by RFC 5321.
const MAX_EMAIL_LENGTH: usize = 254;

const MAX_NAME_LENGTH: usize = 128;

/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

const MIN_NAME_LENGTH: usize = 2;

/// The identity service refuses shorter passwords.
const MIN_PASSWORD_LENGTH: usize = 8;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Name must be at least 2 characters long")]
    NameTooShort,

    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Why a form submission did not sign anyone in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

// ============================================================================
// Fields
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

impl FormField {
    pub fn max_length(&self) -> usize {
        match self {
            FormField::Name => MAX_NAME_LENGTH,
            FormField::Email => MAX_EMAIL_LENGTH,
            FormField::Password | FormField::ConfirmPassword => MAX_PASSWORD_LENGTH,
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, FormField::Password | FormField::ConfirmPassword)
    }
}

/// Check if a character should be accepted into a field
pub fn can_add_char(field: FormField, current_len: usize, c: char) -> bool {
    current_len < field.max_length() && !c.is_control()
}

fn push_char(target: &mut String, field: FormField, c: char) -> bool {
    if can_add_char(field, target.chars().count(), c) {
        target.push(c);
        true
    } else {
        false
    }
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }

    /// Validate, then sign in through the store.
    pub async fn submit(&self, store: &SessionStore) -> Result<Identity, SubmitError> {
        self.validate()?;
        Ok(store.login(&self.email, &self.password).await?)
    }

    pub fn field_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Email => Some(&mut self.email),
            FormField::Password => Some(&mut self.password),
            FormField::Name | FormField::ConfirmPassword => None,
        }
    }

    pub fn push_char(&mut self, field: FormField, c: char) -> bool {
        self.field_mut(field)
            .is_some_and(|target| push_char(target, field, c))
    }

    pub fn pop_char(&mut self, field: FormField) {
        if let Some(target) = self.field_mut(field) {
            target.pop();
        }
    }
}

// ============================================================================
// Register
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// Checks run in the order the user reads the form; the first failure wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty()
            || self.email.is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(ValidationError::MissingFields);
        }
        if self.name.trim().chars().count() < MIN_NAME_LENGTH {
            return Err(ValidationError::NameTooShort);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }

    /// Validate, then create the account and sign in through the store.
    pub async fn submit(&self, store: &SessionStore) -> Result<Identity, SubmitError> {
        self.validate()?;
        Ok(store
            .register(&self.email, &self.password, self.name.trim())
            .await?)
    }

    pub fn field_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Name => Some(&mut self.name),
            FormField::Email => Some(&mut self.email),
            FormField::Password => Some(&mut self.password),
            FormField::ConfirmPassword => Some(&mut self.confirm_password),
        }
    }

    pub fn push_char(&mut self, field: FormField, c: char) -> bool {
        self.field_mut(field)
            .is_some_and(|target| push_char(target, field, c))
    }

    pub fn pop_char(&mut self, field: FormField) {
        if let Some(target) = self.field_mut(field) {
            target.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::testing::FakeIdentityService;
    use crate::auth::SessionStatus;

    fn register_form(name: &str, email: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Email
    // -------------------------------------------------------------------------

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("ab.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a@b.com "));
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    #[test]
    fn test_login_validation() {
        let mut form = LoginForm::default();
        assert_eq!(form.validate(), Err(ValidationError::MissingFields));

        form.email = "not-an-email".to_string();
        form.password = "pw".to_string();
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));

        form.email = "a@b.com".to_string();
        assert_eq!(form.validate(), Ok(()));
    }

    #[tokio::test]
    async fn test_login_with_malformed_email_never_calls_service() {
        let service = Arc::new(FakeIdentityService::new().with_account("a@b.com", "pw1234", "Ada"));
        let store = SessionStore::new(service.clone());

        let form = LoginForm {
            email: "a@b".to_string(),
            password: "pw1234".to_string(),
        };
        let err = form.submit(&store).await.unwrap_err();

        assert_eq!(err, SubmitError::Invalid(ValidationError::InvalidEmail));
        assert!(service.calls().is_empty());
        assert_eq!(store.status(), SessionStatus::Resolving);
    }

    #[tokio::test]
    async fn test_login_submit_success() {
        let service = Arc::new(FakeIdentityService::new().with_account("a@b.com", "pw1234", "Ada"));
        let store = SessionStore::new(service);
        store.check_session().await;

        let form = LoginForm {
            email: "a@b.com".to_string(),
            password: "pw1234".to_string(),
        };
        let identity = form.submit(&store).await.unwrap();

        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
        assert_eq!(store.status(), SessionStatus::Authenticated);
    }

    #[tokio::test]
    async fn test_login_submit_auth_failure() {
        let service = Arc::new(FakeIdentityService::new().with_account("a@b.com", "pw1234", "Ada"));
        let store = SessionStore::new(service);
        store.check_session().await;

        let form = LoginForm {
            email: "a@b.com".to_string(),
            password: "wrong".to_string(),
        };
        let err = form.submit(&store).await.unwrap_err();

        assert_eq!(err, SubmitError::Auth(AuthError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid email or password");
        assert_eq!(store.status(), SessionStatus::Anonymous);
    }

    // -------------------------------------------------------------------------
    // Register
    // -------------------------------------------------------------------------

    #[test]
    fn test_register_validation_order() {
        assert_eq!(
            register_form("", "a@b.com", "pw123456", "pw123456").validate(),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            register_form(" a ", "bad", "short", "other").validate(),
            Err(ValidationError::NameTooShort)
        );
        assert_eq!(
            register_form("ab", "bad", "short", "other").validate(),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            register_form("ab", "a@b.com", "pw12345", "pw12345").validate(),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            register_form("ab", "a@b.com", "pw123456", "pw123457").validate(),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_register_boundary_lengths_pass() {
        // Name of exactly 2 and password of exactly 8 are accepted.
        assert_eq!(
            register_form("ab", "a@b.com", "pw123456", "pw123456").validate(),
            Ok(())
        );
    }

    #[tokio::test]
    async fn test_register_submit_duplicate_email() {
        let service = Arc::new(FakeIdentityService::new().with_account("a@b.com", "other123", "Someone"));
        let store = SessionStore::new(service.clone());
        store.check_session().await;

        let err = register_form("ab", "a@b.com", "pw123456", "pw123456")
            .submit(&store)
            .await
            .unwrap_err();

        assert_eq!(err, SubmitError::Auth(AuthError::AccountExists));
        assert_eq!(store.status(), SessionStatus::Anonymous);
        assert!(!service.calls().contains(&"create_session"));
    }

    #[tokio::test]
    async fn test_register_submit_trims_name() {
        let service = Arc::new(FakeIdentityService::new());
        let store = SessionStore::new(service);
        store.check_session().await;

        let identity = register_form("  Ada  ", "a@b.com", "pw123456", "pw123456")
            .submit(&store)
            .await
            .unwrap();

        assert_eq!(identity.name.as_deref(), Some("Ada"));
        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
    }

    // -------------------------------------------------------------------------
    // Input limits
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_char() {
        assert!(can_add_char(FormField::Email, 0, 'a'));
        assert!(can_add_char(FormField::Email, 253, 'z'));
        assert!(!can_add_char(FormField::Email, 254, 'a'));

        assert!(can_add_char(FormField::Password, 127, '!'));
        assert!(!can_add_char(FormField::Password, 128, 'a'));

        // Control characters rejected
        assert!(!can_add_char(FormField::Name, 0, '\x00'));
        assert!(!can_add_char(FormField::Name, 0, '\n'));
        assert!(!can_add_char(FormField::Password, 0, '\t'));
    }

    #[test]
    fn test_field_editing() {
        let mut form = LoginForm::with_email("a@b.co");
        assert!(form.push_char(FormField::Email, 'm'));
        assert!(!form.push_char(FormField::Name, 'x'));
        assert!(!form.push_char(FormField::Password, '\r'));
        assert_eq!(form.email, "a@b.com");

        form.pop_char(FormField::Email);
        assert_eq!(form.email, "a@b.co");

        let mut register = RegisterForm::default();
        register.push_char(FormField::ConfirmPassword, 'p');
        assert_eq!(register.confirm_password, "p");
        assert!(FormField::ConfirmPassword.is_secret());
        assert!(!FormField::Name.is_secret());
    }
}
