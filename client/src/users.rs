use shared::{
    LoginRequest, PasswordResetRequest, ProfileUpdate, RegisterRequest, ResetPasswordRequest,
    Role, UserProfile, UserUpdate,
};

use crate::error::{ClientError, TransportError};
use crate::session::Session;
use crate::storage::KeyValueStore;
use crate::transport::UsersApi;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const RESET_REQUESTED_MESSAGE: &str =
    "If the email exists, you will receive instructions to reset your password.";
pub const PASSWORD_CHANGED_MESSAGE: &str = "Your password has been updated.";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("The password must be at least {min} characters long.")]
    PasswordTooShort { min: usize },
    #[error("The passwords do not match.")]
    PasswordMismatch,
    #[error("The {0} field is required.")]
    MissingField(&'static str),
    #[error("There is nothing to update.")]
    NothingToUpdate,
}

/// Same acceptance as `\S+@\S+\.\S+`: somewhere in the input a non-blank run
/// before an `@`, followed by a non-blank run holding an inner `.`.
pub fn is_valid_email(input: &str) -> bool {
    input.split_whitespace().any(|word| {
        word.char_indices()
            .filter(|(i, c)| *c == '@' && *i > 0)
            .any(|(i, _)| {
                let rest = &word[i + 1..];
                rest.char_indices()
                    .any(|(j, c)| c == '.' && j > 0 && j + 1 < rest.len())
            })
    })
}

pub fn validate_password(password: &str) -> Result<(), FormError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<(), FormError> {
    if !is_valid_email(email) {
        return Err(FormError::InvalidEmail);
    }
    validate_password(password)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
}

impl RegistrationForm {
    /// New accounts always get the regular user role.
    pub fn validate(&self) -> Result<RegisterRequest, FormError> {
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        validate_login(&self.email, &self.password)?;
        if self.full_name.trim().is_empty() {
            return Err(FormError::MissingField("full name"));
        }
        Ok(RegisterRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            full_name: self.full_name.trim().to_string(),
            role: Role::Usuario,
        })
    }
}

/// Protected areas of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    UserWorkspace,
    AdminDashboard,
}

impl Landing {
    pub fn for_role(role: &Role) -> Option<Self> {
        match role {
            Role::Usuario => Some(Landing::UserWorkspace),
            Role::Admin => Some(Landing::AdminDashboard),
            _ => None,
        }
    }

    pub fn required_role(&self) -> Role {
        match self {
            Landing::UserWorkspace => Role::Usuario,
            Landing::AdminDashboard => Role::Admin,
        }
    }

    /// A token and the matching role are both required.
    pub fn admits(&self, session: &Session) -> bool {
        session.token().is_some() && session.has_role(&self.required_role())
    }
}

fn signed_in(session: &Session) -> Result<&str, ClientError> {
    session
        .token()
        .ok_or_else(|| ClientError::Auth("You need to sign in first.".into()))
}

fn server_message(err: &TransportError, fallback: &str) -> String {
    match err {
        TransportError::Status {
            detail: Some(detail),
            ..
        } if !detail.trim().is_empty() => detail.clone(),
        _ => fallback.to_string(),
    }
}

pub async fn login(
    api: &impl UsersApi,
    store: &impl KeyValueStore,
    email: &str,
    password: &str,
) -> Result<(Session, Landing), ClientError> {
    validate_login(email, password)?;
    let request = LoginRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    };

    let response = api.login(&request).await.map_err(|e| {
        log::warn!("Login failed: {}", e);
        let message = match e {
            TransportError::Status { .. } => {
                server_message(&e, "Incorrect credentials or role not found.")
            }
            _ => "An error occurred while signing in. Please try again.".to_string(),
        };
        ClientError::Auth(message)
    })?;

    let landing = Landing::for_role(&response.role)
        .ok_or_else(|| ClientError::Auth("You do not have permission to access.".into()))?;
    let session = Session::persist(&response, store)
        .map_err(|e| ClientError::Auth(e.to_string()))?;
    log::info!("Signed in with role {}", response.role);
    Ok((session, landing))
}

pub fn logout(store: &impl KeyValueStore) -> Session {
    log::info!("Signing out");
    Session::clear(store)
}

pub async fn register(api: &impl UsersApi, form: &RegistrationForm) -> Result<(), ClientError> {
    let request = form.validate()?;
    api.register(&request).await.map_err(|e| {
        log::warn!("Registration failed: {}", e);
        ClientError::Auth(server_message(&e, "Could not register the user."))
    })
}

pub async fn load_profile(
    api: &impl UsersApi,
    session: &Session,
) -> Result<UserProfile, ClientError> {
    let token = signed_in(session)?;
    api.profile(token)
        .await
        .map_err(|e| ClientError::Auth(server_message(&e, "Could not load the profile.")))
}

pub async fn update_profile(
    api: &impl UsersApi,
    session: &Session,
    name: &str,
    email: &str,
    password: &str,
) -> Result<UserProfile, ClientError> {
    let token = signed_in(session)?;
    let update = ProfileUpdate::from_form(name, email, password);
    if update.is_empty() {
        return Err(FormError::NothingToUpdate.into());
    }
    if let Some(email) = &update.email {
        if !is_valid_email(email) {
            return Err(FormError::InvalidEmail.into());
        }
    }
    if let Some(password) = &update.password {
        validate_password(password)?;
    }
    api.update_profile(token, &update)
        .await
        .map_err(|e| ClientError::Auth(server_message(&e, "Could not update the profile.")))
}

pub async fn list_users(
    api: &impl UsersApi,
    session: &Session,
) -> Result<Vec<UserProfile>, ClientError> {
    let token = signed_in(session)?;
    api.list_users(token)
        .await
        .map_err(|e| ClientError::Auth(server_message(&e, "Could not load the users.")))
}

/// Saves an admin edit and returns the row to display: the server's copy
/// when it can be re-read, otherwise the edit merged into `row`.
pub async fn save_user_edit(
    api: &impl UsersApi,
    session: &Session,
    row: &UserProfile,
    update: &UserUpdate,
) -> Result<UserProfile, ClientError> {
    let token = signed_in(session)?;
    if update.is_empty() {
        return Err(FormError::NothingToUpdate.into());
    }
    if let Some(password) = &update.password {
        validate_password(password)?;
    }
    api.update_user(token, &row.id, update)
        .await
        .map_err(|e| ClientError::Auth(server_message(&e, "Could not save the changes.")))?;

    match api.fetch_user(token, &row.id).await {
        Ok(fresh) => Ok(fresh),
        Err(e) => {
            log::debug!("Re-reading user {} failed, merging locally: {}", row.id, e);
            let mut merged = row.clone();
            merged.apply(update);
            Ok(merged)
        }
    }
}

pub async fn request_password_reset(
    api: &impl UsersApi,
    email: &str,
) -> Result<String, ClientError> {
    if !is_valid_email(email) {
        return Err(FormError::InvalidEmail.into());
    }
    let request = PasswordResetRequest {
        email: email.trim().to_string(),
    };
    match api.request_password_reset(&request).await {
        Ok(_) => Ok(RESET_REQUESTED_MESSAGE.to_string()),
        Err(e @ TransportError::Status { .. }) => Err(ClientError::Auth(server_message(
            &e,
            "Could not request the password reset.",
        ))),
        Err(_) => Err(ClientError::Auth("Network error. Try again later.".into())),
    }
}

pub async fn reset_password(
    api: &impl UsersApi,
    token: &str,
    password: &str,
    confirm_password: &str,
) -> Result<String, ClientError> {
    if token.trim().is_empty() {
        return Err(FormError::MissingField("reset token").into());
    }
    if password != confirm_password {
        return Err(FormError::PasswordMismatch.into());
    }
    validate_password(password)?;
    let request = ResetPasswordRequest {
        token: token.trim().to_string(),
        new_password: password.to_string(),
    };
    let response = api.reset_password(&request).await.map_err(|e| {
        ClientError::Auth(server_message(&e, "Could not reset the password."))
    })?;
    Ok(response
        .message
        .unwrap_or_else(|| PASSWORD_CHANGED_MESSAGE.to_string()))
}
