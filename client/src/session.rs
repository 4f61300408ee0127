use shared::{LoginResponse, Role};

use crate::storage::{KeyValueStore, ROLE_KEY, StorageError, TOKEN_KEY, USER_ID_KEY};

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub token: String,
    pub role: Role,
    pub user_id: Option<String>,
}

/// Who is using the client. There is no fallback user: without a stored
/// token the session is anonymous.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Session {
    pub fn load(store: &impl KeyValueStore) -> Self {
        let Some(token) = store.get(TOKEN_KEY).filter(|t| !t.is_empty()) else {
            return Session::Anonymous;
        };
        let role = store
            .get(ROLE_KEY)
            .and_then(|r| r.parse::<Role>().ok())
            .unwrap_or(Role::Unknown);
        let user_id = store.get(USER_ID_KEY).filter(|id| !id.is_empty());
        Session::Authenticated(Identity {
            token,
            role,
            user_id,
        })
    }

    pub fn persist(login: &LoginResponse, store: &impl KeyValueStore) -> Result<Self, StorageError> {
        store.set(TOKEN_KEY, &login.token)?;
        store.set(ROLE_KEY, &login.role.to_string())?;
        match &login.user_id {
            Some(id) => store.set(USER_ID_KEY, id)?,
            None => store.remove(USER_ID_KEY),
        }
        Ok(Session::Authenticated(Identity {
            token: login.token.clone(),
            role: login.role.clone(),
            user_id: login.user_id.clone(),
        }))
    }

    pub fn clear(store: &impl KeyValueStore) -> Self {
        for key in [TOKEN_KEY, ROLE_KEY, USER_ID_KEY] {
            store.remove(key);
        }
        Session::Anonymous
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated(identity) => Some(identity),
            Session::Anonymous => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.identity().map(|i| i.token.as_str())
    }

    pub fn bearer(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {}", t))
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity().and_then(|i| i.user_id.as_deref())
    }

    pub fn role(&self) -> Option<&Role> {
        self.identity().map(|i| &i.role)
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.role() == Some(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn empty_store_is_anonymous() {
        let store = MemoryStore::new();
        let session = Session::load(&store);
        assert_eq!(session, Session::Anonymous);
        assert_eq!(session.user_id(), None);
        assert_eq!(session.bearer(), None);
    }

    #[test]
    fn persisted_login_round_trips_through_store() {
        let store = MemoryStore::new();
        let login = LoginResponse {
            token: "jwt".into(),
            role: Role::Usuario,
            user_id: Some("64a2".into()),
        };
        let session = Session::persist(&login, &store).unwrap();

        assert_eq!(Session::load(&store), session);
        assert_eq!(store.get(ROLE_KEY).as_deref(), Some("USUARIO"));
        assert_eq!(session.bearer().as_deref(), Some("Bearer jwt"));
        assert!(session.has_role(&Role::Usuario));
    }

    #[test]
    fn clear_removes_every_session_key() {
        let store = MemoryStore::new();
        for key in [TOKEN_KEY, ROLE_KEY, USER_ID_KEY] {
            store.set(key, "x").unwrap();
        }
        assert_eq!(Session::clear(&store), Session::Anonymous);
        assert_eq!(Session::load(&store), Session::Anonymous);
        assert_eq!(store.get(USER_ID_KEY), None);
    }

    #[test]
    fn unknown_role_still_authenticates() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "jwt").unwrap();
        store.set(ROLE_KEY, "SUPERVISOR").unwrap();
        assert_eq!(Session::load(&store).role(), Some(&Role::Unknown));
    }
}
