//! Credential store: the single owner of session state

use crate::CoreError;
use crate::storage::{MemoryStorage, SessionStorage, USER_KEY};
use crate::types::{Session, User, UserUpdate};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Holds the current user and access token
///
/// The user record is mirrored to [`SessionStorage`] on every change. The
/// access token is only ever kept in memory; a restored session is
/// authenticated without a token until the next refresh supplies one.
pub struct CredentialStore {
    state: RwLock<Session>,
    storage: Arc<dyn SessionStorage>,
}

impl CredentialStore {
    /// Create a store backed by `storage`, restoring a persisted user if any
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let user = restore_user(storage.as_ref());
        let state = Session {
            is_authenticated: user.is_some(),
            user,
            access_token: None,
        };
        Self {
            state: RwLock::new(state),
            storage,
        }
    }

    /// Create a store that persists nothing beyond the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    pub fn snapshot(&self) -> Session {
        self.state.read().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.read().access_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated
    }

    /// Start a session for `user` with a fresh access token
    ///
    /// Storage is written after the lock is released.
    pub fn login(&self, user: User, access_token: impl Into<String>) {
        debug!(username = %user.username, "session started");
        *self.state.write() = Session {
            user: Some(user.clone()),
            is_authenticated: true,
            access_token: Some(access_token.into()),
        };
        self.persist(&user);
    }

    /// Drop the user, the token and the persisted record
    pub fn logout(&self) {
        *self.state.write() = Session::default();
        if let Err(e) = self.storage.remove(USER_KEY) {
            warn!("Failed to remove persisted user: {}", e);
        }
    }

    /// Merge `update` into the current user; does nothing when signed out
    pub fn update_user(&self, update: UserUpdate) {
        let updated = {
            let mut state = self.state.write();
            state.user.as_mut().map(|user| {
                user.apply(update);
                user.clone()
            })
        };
        if let Some(user) = updated {
            self.persist(&user);
        }
    }

    /// Replace the access token, keeping everything else
    pub fn set_access_token(&self, token: impl Into<String>) {
        self.state.write().access_token = Some(token.into());
    }

    fn persist(&self, user: &User) {
        let result = serde_json::to_string(user)
            .map_err(CoreError::from)
            .and_then(|serialized| self.storage.set(USER_KEY, &serialized));
        if let Err(e) = result {
            warn!("Failed to persist user: {}", e);
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("CredentialStore")
            .field("user", &state.user.as_ref().map(|u| &u.username))
            .field("is_authenticated", &state.is_authenticated)
            .field("has_token", &state.access_token.is_some())
            .finish()
    }
}

fn restore_user(storage: &dyn SessionStorage) -> Option<User> {
    let stored = match storage.get(USER_KEY) {
        Ok(stored) => stored?,
        Err(e) => {
            warn!("Failed to read persisted user: {}", e);
            return None;
        }
    };
    match serde_json::from_str(&stored) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!("Ignoring corrupt persisted user: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreResult;
    use crate::storage::mock::MockSessionStorage;
    use parking_lot::Mutex;
    use std::sync::{OnceLock, Weak};

    fn test_user() -> User {
        User {
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            role: "user".to_string(),
            name: Some("Test User".to_string()),
            phone: None,
            customer_id: None,
            customer_name: None,
        }
    }

    #[test]
    fn starts_unauthenticated() {
        let store = CredentialStore::in_memory();
        let session = store.snapshot();
        assert!(!session.is_authenticated);
        assert!(session.user.is_none());
        assert!(session.access_token.is_none());
    }

    #[test]
    fn login_sets_user_and_token() {
        let store = CredentialStore::in_memory();
        store.login(test_user(), "fake-token");

        assert!(store.is_authenticated());
        assert_eq!(store.access_token().as_deref(), Some("fake-token"));
        assert_eq!(
            store.user().and_then(|u| u.name).as_deref(),
            Some("Test User")
        );
    }

    #[test]
    fn logout_clears_memory_and_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(storage.clone());
        store.login(test_user(), "fake-token");
        assert!(storage.get(USER_KEY).unwrap().is_some());

        store.logout();

        assert_eq!(store.snapshot(), Session::default());
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn update_user_merges_and_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(storage.clone());
        store.login(test_user(), "fake-token");

        store.update_user(UserUpdate {
            name: Some("Updated Name".to_string()),
            ..Default::default()
        });

        let user = store.user().unwrap();
        assert_eq!(user.name.as_deref(), Some("Updated Name"));
        assert_eq!(user.email, "test@example.com");
        assert_eq!(store.access_token().as_deref(), Some("fake-token"));

        let persisted: User =
            serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, user);
    }

    #[test]
    fn update_user_without_session_is_a_no_op() {
        let store = CredentialStore::in_memory();
        store.update_user(UserUpdate {
            name: Some("Nobody".to_string()),
            ..Default::default()
        });
        assert!(store.user().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn restores_persisted_user_without_token() {
        let storage = Arc::new(MemoryStorage::new());
        CredentialStore::new(storage.clone()).login(test_user(), "fake-token");

        let restored = CredentialStore::new(storage);
        assert!(restored.is_authenticated());
        assert_eq!(restored.user(), Some(test_user()));
        assert_eq!(restored.access_token(), None);
    }

    #[test]
    fn ignores_corrupt_persisted_user() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(USER_KEY, "not json").unwrap();

        let store = CredentialStore::new(storage);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn storage_failures_do_not_block_state_changes() {
        let mut storage = MockSessionStorage::new();
        storage
            .expect_get()
            .returning(|_| Err(CoreError::storage_error("unavailable")));
        storage
            .expect_set()
            .returning(|_, _| Err(CoreError::storage_error("disk full")));
        storage
            .expect_remove()
            .returning(|_| Err(CoreError::storage_error("read-only")));

        let store = CredentialStore::new(Arc::new(storage));
        store.login(test_user(), "fake-token");
        assert!(store.is_authenticated());

        store.logout();
        assert!(!store.is_authenticated());
        assert!(store.access_token().is_none());
    }

    /// Storage that reads the store back while it is being written to
    #[derive(Default)]
    struct ReentrantStorage {
        store: OnceLock<Weak<CredentialStore>>,
        seen: Mutex<Vec<(&'static str, bool)>>,
    }

    impl ReentrantStorage {
        fn observe(&self, op: &'static str) {
            if let Some(store) = self.store.get().and_then(Weak::upgrade) {
                self.seen.lock().push((op, store.is_authenticated()));
            }
        }
    }

    impl SessionStorage for ReentrantStorage {
        fn get(&self, _key: &str) -> CoreResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> CoreResult<()> {
            self.observe("set");
            Ok(())
        }

        fn remove(&self, _key: &str) -> CoreResult<()> {
            self.observe("remove");
            Ok(())
        }
    }

    #[test]
    fn storage_may_read_the_store_during_writes() {
        let storage = Arc::new(ReentrantStorage::default());
        let store = Arc::new(CredentialStore::new(storage.clone()));
        storage.store.set(Arc::downgrade(&store)).unwrap();

        store.login(test_user(), "fake-token");
        store.update_user(UserUpdate {
            phone: Some("555-0100".to_string()),
            ..Default::default()
        });
        store.logout();

        assert_eq!(
            *storage.seen.lock(),
            vec![("set", true), ("set", true), ("remove", false)]
        );
    }
}
