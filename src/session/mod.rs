//! Session context and role resolution
//!
//! The auth collaborator owns identity; this module owns what the
//! application keeps per session: who is signed in and whether they are an
//! admin. The context is an explicit object with an
//! init / update-on-auth-event / clear lifecycle - no ambient globals.
//! The role lookup on init is the one retried call in the system.

use async_trait::async_trait;

use crate::domain::UserId;
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::store::{Store, StoreError};

/// Identity of the signed-in user, as issued by the auth collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: UserId,
    pub email: String,
}

/// Login/logout notifications pushed by the auth collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(UserIdentity),
    SignedOut,
}

/// The authentication collaborator
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The currently signed-in user, if any
    async fn current_user(&self) -> Option<UserIdentity>;
}

/// Per-session state: current identity and resolved role
#[derive(Debug, Default)]
pub struct SessionContext {
    user: Option<UserIdentity>,
    is_admin: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize from the auth collaborator on application load.
    ///
    /// The role lookup retries with linear backoff before giving up; a
    /// failure here is surfaced as a blocking load error.
    pub async fn init(
        &mut self,
        auth: &dyn AuthProvider,
        store: &dyn Store,
        policy: RetryPolicy,
    ) -> Result<(), StoreError> {
        match auth.current_user().await {
            Some(identity) => self.resolve_role(store, identity, policy).await,
            None => {
                self.clear();
                Ok(())
            }
        }
    }

    /// Apply a login/logout notification
    pub async fn on_auth_event(
        &mut self,
        store: &dyn Store,
        event: SessionEvent,
        policy: RetryPolicy,
    ) -> Result<(), StoreError> {
        match event {
            SessionEvent::SignedIn(identity) => self.resolve_role(store, identity, policy).await,
            SessionEvent::SignedOut => {
                self.clear();
                Ok(())
            }
        }
    }

    /// Drop the identity and the admin flag
    pub fn clear(&mut self) {
        self.user = None;
        self.is_admin = false;
    }

    pub fn current_user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    async fn resolve_role(
        &mut self,
        store: &dyn Store,
        identity: UserIdentity,
        policy: RetryPolicy,
    ) -> Result<(), StoreError> {
        let lookup = retry_with_backoff(policy, || store.get_user(&identity.user_id)).await;

        match lookup {
            Ok(user) => {
                self.is_admin = user.is_admin();
                self.user = Some(identity);
                Ok(())
            }
            // An identity without a profile row is a signed-in non-admin
            Err(StoreError::NotFound) => {
                self.is_admin = false;
                self.user = Some(identity);
                Ok(())
            }
            Err(err) => {
                self.clear();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::{Office, Role};
    use crate::store::{NewUser, SqliteStore, Store};

    struct FixedAuth(Option<UserIdentity>);

    #[async_trait]
    impl AuthProvider for FixedAuth {
        async fn current_user(&self) -> Option<UserIdentity> {
            self.0.clone()
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(2, std::time::Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_init_without_identity_clears_context() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut session = SessionContext::new();
        session
            .init(&FixedAuth(None), &store, policy())
            .await
            .unwrap();
        assert!(session.current_user().is_none());
        assert!(!session.is_admin());
    }

    #[tokio::test]
    async fn test_init_resolves_admin_role() {
        let store = SqliteStore::open_in_memory().unwrap();
        let admin = store
            .create_user(
                NewUser {
                    full_name: "Admin".to_string(),
                    email: "admin@example.com".to_string(),
                    longrich_code: "LR0001".to_string(),
                    office: Office::Annani,
                    role: Role::Admin,
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let identity = UserIdentity {
            user_id: admin.id.clone(),
            email: admin.email.clone(),
        };
        let mut session = SessionContext::new();
        session
            .init(&FixedAuth(Some(identity.clone())), &store, policy())
            .await
            .unwrap();
        assert_eq!(session.current_user(), Some(&identity));
        assert!(session.is_admin());
    }

    #[tokio::test]
    async fn test_sign_out_event_clears_context() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut session = SessionContext::new();
        session
            .on_auth_event(
                &store,
                SessionEvent::SignedIn(UserIdentity {
                    user_id: "ghost".to_string(),
                    email: "ghost@example.com".to_string(),
                }),
                policy(),
            )
            .await
            .unwrap();
        // Unknown profile: signed in, but not an admin
        assert!(session.current_user().is_some());
        assert!(!session.is_admin());

        session
            .on_auth_event(&store, SessionEvent::SignedOut, policy())
            .await
            .unwrap();
        assert!(session.current_user().is_none());
    }
}
