use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Signed-in session as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn label(&self) -> &str {
        self.user.email.as_deref().unwrap_or(&self.user.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    /// Account created; the user has to confirm the email first.
    ConfirmationSent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
    #[default]
    Email,
    Password,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
}

/// Transient state of the login/registration overlay.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub open: bool,
    pub mode: AuthMode,
    pub field: AuthField,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub oauth_url: Option<String>,
}

impl AuthForm {
    pub fn open(&mut self) {
        *self = AuthForm {
            open: true,
            ..AuthForm::default()
        };
    }

    pub fn close(&mut self) {
        *self = AuthForm::default();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.field = AuthField::Email;
        self.confirm.clear();
        self.error = None;
        self.notice = None;
    }

    pub fn next_field(&mut self) {
        self.field = match (self.mode, self.field) {
            (_, AuthField::Email) => AuthField::Password,
            (AuthMode::Register, AuthField::Password) => AuthField::Confirm,
            _ => AuthField::Email,
        };
    }

    pub fn active_buffer(&mut self) -> &mut String {
        match self.field {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::Confirm => &mut self.confirm,
        }
    }

    pub fn validate(&self) -> Result<AuthRequest, ValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        match self.mode {
            AuthMode::Login => Ok(AuthRequest::SignIn {
                email: email.to_string(),
                password: self.password.clone(),
            }),
            AuthMode::Register => {
                if self.password != self.confirm {
                    return Err(ValidationError::PasswordMismatch);
                }
                Ok(AuthRequest::SignUp {
                    email: email.to_string(),
                    password: self.password.clone(),
                })
            }
        }
    }

    /// Validates and flips into the loading state; errors land on the form.
    pub fn submit(&mut self) -> Option<AuthRequest> {
        if self.loading {
            return None;
        }
        match self.validate() {
            Ok(request) => {
                self.error = None;
                self.notice = None;
                self.loading = true;
                Some(request)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_matching_confirmation() {
        let mut form = AuthForm::default();
        form.open();
        form.toggle_mode();
        form.email = "a@b.it".to_string();
        form.password = "secret1".to_string();
        form.confirm = "secret2".to_string();
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));
        assert!(form.submit().is_none());
        assert!(!form.loading);

        form.confirm = "secret1".to_string();
        assert!(matches!(form.submit(), Some(AuthRequest::SignUp { .. })));
        assert!(form.loading);
    }

    #[test]
    fn short_password_is_rejected() {
        let form = AuthForm {
            email: "a@b.it".to_string(),
            password: "12345".to_string(),
            ..AuthForm::default()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
    }
}
