use serde::{Deserialize, Serialize};

use osdesk_core::error::require_text;
use osdesk_core::{DomainError, UserId};

use crate::AuthError;
use crate::password::{hash_password, verify_password};

/// Operator account. All users have equal privileges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Sign-up form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

/// Edit form; an empty or absent `password` keeps the current one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub username: String,
    pub password: Option<String>,
}

impl User {
    pub fn register(id: UserId, form: Registration) -> Result<Self, AuthError> {
        let username = form.username.trim();
        if username.is_empty() || form.password.is_empty() {
            return Err(DomainError::validation("username and password are required").into());
        }
        if form.password != form.password_confirmation {
            return Err(DomainError::validation("passwords do not match").into());
        }

        Ok(Self {
            id,
            username: username.to_string(),
            password_hash: hash_password(&form.password)?,
        })
    }

    pub fn update(&mut self, form: UserUpdate) -> Result<(), AuthError> {
        let username = require_text("username", &form.username)?;
        let new_hash = match form.password.as_deref() {
            Some(p) if !p.is_empty() => Some(hash_password(p)?),
            _ => None,
        };

        self.username = username;
        if let Some(hash) = new_hash {
            self.password_hash = hash;
        }
        Ok(())
    }

    /// Check a login attempt against the stored hash.
    pub fn authenticate(&self, password: &str) -> Result<(), AuthError> {
        if verify_password(password, &self.password_hash)? {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            username: username.into(),
            password: password.into(),
            password_confirmation: confirm.into(),
        }
    }

    #[test]
    fn register_requires_username_and_password() {
        let err = User::register(UserId::new(), form(" ", "x", "x")).unwrap_err();
        assert!(err.to_string().contains("username and password are required"));

        let err = User::register(UserId::new(), form("ana", "", "")).unwrap_err();
        assert!(err.to_string().contains("username and password are required"));
    }

    #[test]
    fn register_rejects_mismatched_confirmation() {
        let err = User::register(UserId::new(), form("ana", "abc", "abd")).unwrap_err();
        assert!(err.to_string().contains("passwords do not match"));
    }

    #[test]
    fn registered_user_authenticates() {
        let user = User::register(UserId::new(), form("ana", "segredo", "segredo")).unwrap();
        assert!(user.authenticate("segredo").is_ok());
        assert!(matches!(user.authenticate("errado"), Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn update_keeps_password_when_blank() {
        let mut user = User::register(UserId::new(), form("ana", "segredo", "segredo")).unwrap();
        let before = user.password_hash.clone();

        user.update(UserUpdate { username: "ana.silva".into(), password: Some(String::new()) })
            .unwrap();
        assert_eq!(user.username, "ana.silva");
        assert_eq!(user.password_hash, before);

        user.update(UserUpdate { username: "ana.silva".into(), password: Some("nova".into()) })
            .unwrap();
        assert!(user.authenticate("nova").is_ok());
    }

    #[test]
    fn hash_is_not_serialized() {
        let user = User::register(UserId::new(), form("ana", "segredo", "segredo")).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "ana");
        assert!(json.get("password_hash").is_none());
    }
}
