use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::{AppConfig, OwnerConfig},
    storage::{FileStore, KeyValueStore},
};

use super::models::{Profile, Role};

/// Storage key holding the authenticated marker.
pub const AUTH_FLAG_KEY: &str = "ownerAuth";
/// Storage key holding the JSON-encoded [`Profile`].
pub const USER_PROFILE_KEY: &str = "ownerUser";
/// The only value of [`AUTH_FLAG_KEY`] that counts as signed in.
pub const AUTH_FLAG_TRUE: &str = "true";

/// Failures surfaced by the session gate.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Email/password mismatch. Deliberately does not say which one.
    #[error("Invalid email or password. Please try again.")]
    InvalidCredentials,
    /// The gate was used without a mounted [`SessionContext`].
    #[error("session gate not initialized")]
    NotInitialized,
    /// Durable storage could not be written.
    #[error("session storage failed: {0:#}")]
    Storage(anyhow::Error),
}

/// Expected owner credentials and the profile details issued on login.
#[derive(Debug, Clone, Default)]
pub struct OwnerCredentials {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: String,
    pub avatar: String,
}

impl From<&OwnerConfig> for OwnerCredentials {
    fn from(config: &OwnerConfig) -> Self {
        Self {
            email: config.email.clone(),
            password: config.password.clone(),
            name: config.name.clone(),
            avatar: config.avatar.clone(),
        }
    }
}

/// Owner sign-in state backed by durable storage.
///
/// `user` is the single source of truth: the gate is authenticated exactly
/// when a profile is present.
pub struct SessionGate {
    store: Box<dyn KeyValueStore>,
    credentials: OwnerCredentials,
    user: Option<Profile>,
}

impl SessionGate {
    /// Build a gate and restore any session recorded in `store`.
    pub fn restore(store: Box<dyn KeyValueStore>, credentials: OwnerCredentials) -> Self {
        let user = restore_profile(store.as_ref());
        if let Some(profile) = &user {
            info!(email = %profile.email, "Restored owner session");
        }
        Self {
            store,
            credentials,
            user,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&Profile> {
        self.user.as_ref()
    }

    /// Compare `email`/`password` against the configured owner credentials.
    ///
    /// On success both storage keys are written before the in-memory state
    /// changes; on any failure the state and storage are left as they were.
    pub fn attempt_login(&mut self, email: &str, password: &str) -> Result<Profile, SessionError> {
        let (Some(expected_email), Some(expected_password)) =
            (&self.credentials.email, &self.credentials.password)
        else {
            warn!("Owner login attempted but credentials are not configured");
            return Err(SessionError::InvalidCredentials);
        };

        // Evaluate both comparisons so the outcome does not depend on which failed.
        let email_ok = email == expected_email;
        let password_ok = password == expected_password;
        if !(email_ok & password_ok) {
            warn!("Owner login rejected");
            return Err(SessionError::InvalidCredentials);
        }

        let profile = Profile {
            name: self.credentials.name.clone(),
            email: expected_email.clone(),
            image: self.credentials.avatar.clone(),
            role: Role::Owner,
        };
        self.persist(&profile).map_err(SessionError::Storage)?;
        self.user = Some(profile.clone());
        info!(email = %profile.email, "Owner signed in");
        Ok(profile)
    }

    /// Clear the session and both storage keys. Never fails; storage errors
    /// are logged.
    pub fn logout(&mut self) {
        let was_authenticated = self.user.take().is_some();
        for key in [AUTH_FLAG_KEY, USER_PROFILE_KEY] {
            if let Err(err) = self.store.remove(key) {
                warn!(?err, key, "Failed to clear session key");
            }
        }
        if was_authenticated {
            info!("Owner signed out");
        }
    }

    fn persist(&self, profile: &Profile) -> anyhow::Result<()> {
        let encoded = serde_json::to_string(profile)?;
        self.store.set(USER_PROFILE_KEY, &encoded)?;
        if let Err(err) = self.store.set(AUTH_FLAG_KEY, AUTH_FLAG_TRUE) {
            if let Err(rollback) = self.store.remove(USER_PROFILE_KEY) {
                warn!(err = ?rollback, key = USER_PROFILE_KEY, "Failed to roll back session key");
            }
            return Err(err);
        }
        Ok(())
    }
}

fn restore_profile(store: &dyn KeyValueStore) -> Option<Profile> {
    match store.get(AUTH_FLAG_KEY) {
        Ok(Some(flag)) if flag == AUTH_FLAG_TRUE => {}
        Ok(_) => return None,
        Err(err) => {
            warn!(?err, "Failed to read session flag; starting signed out");
            return None;
        }
    }
    match store.get(USER_PROFILE_KEY) {
        Ok(Some(raw)) => match serde_json::from_str::<Profile>(&raw) {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(?err, "Stored owner profile is invalid; starting signed out");
                None
            }
        },
        Ok(None) => {
            warn!("Session flag set without a stored profile; starting signed out");
            None
        }
        Err(err) => {
            warn!(?err, "Failed to read stored profile; starting signed out");
            None
        }
    }
}

/// Handle to the single session gate of a running application.
///
/// Cloning shares the same gate. A default (unmounted) context rejects every
/// call with [`SessionError::NotInitialized`].
#[derive(Clone, Default)]
pub struct SessionContext {
    gate: Option<Arc<RwLock<SessionGate>>>,
}

impl SessionContext {
    /// Mount `gate` as the application's session.
    pub fn mount(gate: SessionGate) -> Self {
        Self {
            gate: Some(Arc::new(RwLock::new(gate))),
        }
    }

    /// Mount a gate persisting to the configured storage file.
    pub fn from_config(config: &AppConfig) -> Self {
        let store = FileStore::new(config.storage_path.clone());
        Self::mount(SessionGate::restore(
            Box::new(store),
            OwnerCredentials::from(&config.owner),
        ))
    }

    /// A context with no gate behind it.
    pub fn unmounted() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        self.gate.is_some()
    }

    fn gate(&self) -> Result<&Arc<RwLock<SessionGate>>, SessionError> {
        self.gate.as_ref().ok_or(SessionError::NotInitialized)
    }

    pub fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self.gate()?.read().is_authenticated())
    }

    pub fn user(&self) -> Result<Option<Profile>, SessionError> {
        Ok(self.gate()?.read().user().cloned())
    }

    pub fn attempt_login(&self, email: &str, password: &str) -> Result<Profile, SessionError> {
        self.gate()?.write().attempt_login(email, password)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.gate()?.write().logout();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const EMAIL: &str = "owner@example.com";
    const PASSWORD: &str = "s3cret";

    fn credentials() -> OwnerCredentials {
        OwnerCredentials {
            email: Some(EMAIL.to_string()),
            password: Some(PASSWORD.to_string()),
            name: "Fleet Owner".to_string(),
            avatar: "avatar.png".to_string(),
        }
    }

    fn gate_with(store: &Arc<MemoryStore>) -> SessionGate {
        SessionGate::restore(Box::new(Arc::clone(store)), credentials())
    }

    #[test]
    fn correct_login_persists_both_keys() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        let mut gate = gate_with(&store);
        assert!(!gate.is_authenticated());

        let profile = gate.attempt_login(EMAIL, PASSWORD)?;
        assert!(gate.is_authenticated());
        assert_eq!(profile.name, "Fleet Owner");
        assert_eq!(profile.role, Role::Owner);
        assert_eq!(profile.image, "avatar.png");

        assert_eq!(store.get(AUTH_FLAG_KEY)?.as_deref(), Some(AUTH_FLAG_TRUE));
        let stored: Profile =
            serde_json::from_str(&store.get(USER_PROFILE_KEY)?.unwrap_or_default())?;
        assert_eq!(stored, profile);
        Ok(())
    }

    #[test]
    fn wrong_password_changes_nothing() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        let mut gate = gate_with(&store);

        let err = gate.attempt_login(EMAIL, "wrong").unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
        let other = gate.attempt_login("someone@example.com", PASSWORD).unwrap_err();
        assert_eq!(err.to_string(), other.to_string());

        assert!(!gate.is_authenticated());
        assert!(gate.user().is_none());
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn unconfigured_credentials_reject_everything() {
        let store = Arc::new(MemoryStore::new());
        let mut gate = SessionGate::restore(
            Box::new(Arc::clone(&store)),
            OwnerCredentials::default(),
        );
        assert!(matches!(
            gate.attempt_login("", ""),
            Err(SessionError::InvalidCredentials)
        ));
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn login_recovers_from_corrupt_storage_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json")?;

        let mut gate = SessionGate::restore(Box::new(FileStore::new(&path)), credentials());
        assert!(!gate.is_authenticated());

        gate.attempt_login(EMAIL, PASSWORD)?;
        assert!(gate.is_authenticated());

        let reopened = SessionGate::restore(Box::new(FileStore::new(&path)), credentials());
        assert_eq!(reopened.user().map(|p| p.email.as_str()), Some(EMAIL));
        Ok(())
    }

    /// Accepts every write except the auth flag.
    struct FlagRejectingStore(MemoryStore);

    impl KeyValueStore for FlagRejectingStore {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            if key == AUTH_FLAG_KEY {
                anyhow::bail!("disk full");
            }
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> anyhow::Result<()> {
            self.0.remove(key)
        }
    }

    #[test]
    fn failed_flag_write_rolls_back_profile() {
        let mut gate = SessionGate::restore(
            Box::new(FlagRejectingStore(MemoryStore::new())),
            credentials(),
        );
        assert!(matches!(
            gate.attempt_login(EMAIL, PASSWORD),
            Err(SessionError::Storage(_))
        ));
        assert!(!gate.is_authenticated());
        assert!(matches!(gate.store.get(USER_PROFILE_KEY), Ok(None)));
    }

    #[test]
    fn logout_is_idempotent() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        let mut gate = gate_with(&store);
        gate.attempt_login(EMAIL, PASSWORD)?;

        gate.logout();
        assert!(!gate.is_authenticated());
        assert!(store.is_empty());
        gate.logout();
        assert!(!gate.is_authenticated());
        assert!(gate.user().is_none());
        Ok(())
    }

    #[test]
    fn session_restores_from_storage() -> anyhow::Result<()> {
        let profile = Profile {
            name: "Fleet Owner".to_string(),
            email: EMAIL.to_string(),
            image: "avatar.png".to_string(),
            role: Role::Owner,
        };
        let store = Arc::new(MemoryStore::seeded([
            (AUTH_FLAG_KEY.to_string(), AUTH_FLAG_TRUE.to_string()),
            (USER_PROFILE_KEY.to_string(), serde_json::to_string(&profile)?),
        ]));

        let gate = gate_with(&store);
        assert!(gate.is_authenticated());
        assert_eq!(gate.user(), Some(&profile));
        Ok(())
    }

    #[test]
    fn stale_profile_without_flag_is_ignored() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::seeded([
            (AUTH_FLAG_KEY, "TRUE"),
            (
                USER_PROFILE_KEY,
                r#"{"name":"Old","email":"old@example.com","image":"x","role":"owner"}"#,
            ),
        ]));
        let gate = gate_with(&store);
        assert!(!gate.is_authenticated());
        assert!(gate.user().is_none());

        let flag_only = Arc::new(MemoryStore::seeded([(AUTH_FLAG_KEY, AUTH_FLAG_TRUE)]));
        assert!(!gate_with(&flag_only).is_authenticated());
        Ok(())
    }

    #[test]
    fn unmounted_context_fails_fast() {
        let context = SessionContext::unmounted();
        assert!(!context.is_mounted());
        assert!(matches!(
            context.attempt_login(EMAIL, PASSWORD),
            Err(SessionError::NotInitialized)
        ));
        assert!(matches!(context.logout(), Err(SessionError::NotInitialized)));
        assert!(matches!(
            context.is_authenticated(),
            Err(SessionError::NotInitialized)
        ));
    }

    #[test]
    fn context_clones_share_one_gate() -> anyhow::Result<()> {
        let store = Arc::new(MemoryStore::new());
        let context = SessionContext::mount(gate_with(&store));
        let other = context.clone();

        context.attempt_login(EMAIL, PASSWORD)?;
        assert!(other.is_authenticated()?);
        other.logout()?;
        assert!(!context.is_authenticated()?);
        Ok(())
    }
}
