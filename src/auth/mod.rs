//! Authentication state and IDP login/logout.
//!
//! Providers are late-bound: hosts register them by name and the
//! configuration's `auth.use` picks one at login time.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::navigation::AuthState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Expiry as epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_expiration_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Value>,
}

impl AuthData {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.access_token_expiration_date.is_some_and(|exp| exp <= now_ms)
    }
}

#[async_trait(?Send)]
pub trait IdpProvider {
    async fn login(&self) -> Result<AuthData, AuthError>;
    async fn logout(&self, data: Option<&AuthData>) -> Result<(), AuthError>;
}

#[derive(Debug, Default)]
pub struct AuthStore {
    data: RefCell<Option<AuthData>>,
}

impl AuthStore {
    pub fn set(&self, data: AuthData) {
        *self.data.borrow_mut() = Some(data);
    }

    pub fn get(&self) -> Option<AuthData> {
        self.data.borrow().clone()
    }

    pub fn clear(&self) {
        self.data.borrow_mut().take();
    }

    pub fn is_logged_in(&self) -> bool {
        let now = chrono::Utc::now().timestamp_millis();
        self.data.borrow().as_ref().is_some_and(|d| !d.is_expired(now))
    }

    pub fn state(&self, config: &AuthConfig) -> AuthState {
        AuthState {
            authorization_enabled: config.provider.is_some(),
            logged_in: self.is_logged_in(),
        }
    }
}

/// Login/logout against the configured provider.
#[derive(Default)]
pub struct Authenticator {
    providers: RefCell<BTreeMap<String, Rc<dyn IdpProvider>>>,
}

impl Authenticator {
    pub fn register_provider(&self, name: impl Into<String>, provider: Rc<dyn IdpProvider>) {
        self.providers.borrow_mut().insert(name.into(), provider);
    }

    fn provider(&self, config: &AuthConfig) -> Option<Rc<dyn IdpProvider>> {
        let name = config.provider.as_deref()?;
        self.providers.borrow().get(name).cloned()
    }

    /// `Ok(None)` when a failure was absorbed by a configured hook.
    pub async fn login(&self, config: &AuthConfig, store: &AuthStore) -> Result<Option<AuthData>, AuthError> {
        let Some(provider) = self.provider(config) else {
            return handle(AuthError::provider_not_found(), config.on_auth_config_error.as_ref()).map(|_| None);
        };
        match provider.login().await {
            Ok(data) => {
                tracing::info!("login succeeded");
                store.set(data.clone());
                Ok(Some(data))
            }
            Err(err) => handle(err, config.on_auth_error.as_ref()).map(|_| None),
        }
    }

    pub async fn logout(&self, config: &AuthConfig, store: &AuthStore) -> Result<(), AuthError> {
        let Some(provider) = self.provider(config) else {
            return handle(AuthError::provider_not_found(), config.on_auth_config_error.as_ref());
        };
        let data = store.get();
        let result = provider.logout(data.as_ref()).await;
        store.clear();
        match result {
            Ok(()) => Ok(()),
            Err(err) => handle(err, config.on_auth_error.as_ref()),
        }
    }
}

fn handle(
    err: AuthError,
    hook: Option<&crate::core::value::Callback<crate::config::AuthErrorHook>>,
) -> Result<(), AuthError> {
    match hook {
        Some(hook) => {
            tracing::error!(name = %err.name, "{}", err.message);
            if (hook.0)(&err) {
                Err(err)
            } else {
                Ok(())
            }
        }
        None => Err(err),
    }
}
