use super::{gate::SessionContext, gate::SessionError, models::Profile};

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Show the login view in place of the protected content.
    Login,
    /// Show the protected content for this profile.
    Granted(Profile),
}

/// Decides between the login view and owner-only content.
///
/// Holds no state: every call reads the current session, so a login or
/// logout is reflected on the very next check.
pub struct RouteGuard;

impl RouteGuard {
    pub fn check(context: &SessionContext) -> Result<Access, SessionError> {
        Ok(match context.user()? {
            Some(profile) => Access::Granted(profile),
            None => Access::Login,
        })
    }

    /// Render `protected` when signed in, `login` otherwise.
    pub fn render<T>(
        context: &SessionContext,
        protected: impl FnOnce(&Profile) -> T,
        login: impl FnOnce() -> T,
    ) -> Result<T, SessionError> {
        Ok(match Self::check(context)? {
            Access::Granted(profile) => protected(&profile),
            Access::Login => login(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        session::{OwnerCredentials, SessionGate},
        storage::MemoryStore,
    };

    fn context() -> SessionContext {
        let credentials = OwnerCredentials {
            email: Some("owner@example.com".to_string()),
            password: Some("pw".to_string()),
            name: "Owner".to_string(),
            avatar: "avatar.png".to_string(),
        };
        SessionContext::mount(SessionGate::restore(
            Box::new(Arc::new(MemoryStore::new())),
            credentials,
        ))
    }

    #[test]
    fn guard_tracks_login_and_logout() -> anyhow::Result<()> {
        let context = context();
        let view = |ctx: &SessionContext| {
            RouteGuard::render(ctx, |profile| format!("dashboard:{}", profile.name), || {
                "login".to_string()
            })
        };

        assert_eq!(view(&context)?, "login");
        context.attempt_login("owner@example.com", "pw")?;
        assert_eq!(view(&context)?, "dashboard:Owner");
        context.logout()?;
        assert_eq!(view(&context)?, "login");
        assert_eq!(RouteGuard::check(&context)?, Access::Login);
        Ok(())
    }

    #[test]
    fn guard_requires_mounted_context() {
        let result = RouteGuard::check(&SessionContext::unmounted());
        assert!(matches!(result, Err(SessionError::NotInitialized)));
    }
}
