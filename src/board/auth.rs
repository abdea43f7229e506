//! Login, registration and logout.

use tracing::info;

use super::gateway::Gateway;
use super::models::{NewAccount, UserRef};
use super::session::Credentials;
use super::shape;
use crate::errors::ClientError;

/// Authenticate and store the returned token in the session.
pub async fn login(gateway: &Gateway, email: &str, password: &str) -> Result<Credentials, ClientError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ClientError::InvalidInput(
            "Email and password are required".into(),
        ));
    }

    let body = gateway.login_raw(email, password).await?;
    let token = shape::access_token(&body).ok_or_else(|| ClientError::Decode {
        path: "/auth/login".into(),
        message: "No access token received".into(),
    })?;
    let user = shape::session_user(&body).unwrap_or_else(|| UserRef {
        email: email.to_string(),
        ..UserRef::default()
    });

    let credentials = Credentials {
        token,
        user: Some(user),
    };
    gateway.session().establish(credentials.clone())?;
    info!(email, "Logged in");
    Ok(credentials)
}

/// Create an account. Does not log in.
pub async fn register(gateway: &Gateway, account: &NewAccount) -> Result<(), ClientError> {
    if account.email.trim().is_empty() || account.password.is_empty() {
        return Err(ClientError::InvalidInput(
            "Email and password are required".into(),
        ));
    }
    gateway.register_account(account).await?;
    info!(email = %account.email, "Registered account");
    Ok(())
}

pub fn logout(gateway: &Gateway) -> Result<(), ClientError> {
    gateway.session().logout()
}
