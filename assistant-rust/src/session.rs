//! Client-side session marker. Credentials are not verified anywhere: any
//! non-empty email and password pair signs in.

use crate::store::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please fill in all fields")]
    MissingCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Store `{email}` as the signed-in user.
pub fn login<S>(store: &S, email: &str, password: &str) -> Result<User, SessionError>
where
    S: KeyValueStore + ?Sized,
{
    let email = email.trim();
    if email.is_empty() || password.trim().is_empty() {
        return Err(SessionError::MissingCredentials);
    }

    let user = User {
        email: email.to_string(),
        name: None,
    };
    let raw = serde_json::to_string(&user).map_err(|source| StoreError::Value {
        key: USER_KEY.to_string(),
        source,
    })?;
    store.set_item(USER_KEY, raw)?;
    tracing::info!(email = %user.email, "signed in");
    Ok(user)
}

pub fn current_user<S>(store: &S) -> Result<Option<User>, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    store
        .get_item(USER_KEY)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|source| StoreError::Value {
                key: USER_KEY.to_string(),
                source,
            })
        })
        .transpose()
}

/// Forget the signed-in user. History and favorites are kept.
pub fn logout<S>(store: &S) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
{
    store.remove_item(USER_KEY)
}
