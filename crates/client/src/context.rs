//! The auth/session state machine.
//!
//! One long-lived context owns every session-field mutation. It moves
//! between three conditions: initializing (from construction until the
//! boot-time silent refresh settles), authenticated, and unauthenticated.
//! Remote failures on `login`/`refresh`/`logout` always run local cleanup
//! before the error reaches the caller — a finally-style guarantee, not a
//! swallow.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde_json::Value;

use wisal_auth::{GuardState, Role};
use wisal_core::{EmployeeId, InstitutionId};

use crate::derive::derive_session;
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::store::SessionStore;

const LOGIN_ENDPOINT: &str = "/auth/login";
const SIGNUP_ENDPOINT: &str = "/auth/signup";
const REFRESH_ENDPOINT: &str = "/auth/refresh";
const LOGOUT_ENDPOINT: &str = "/auth/logout";

/// Login form credentials.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Read-only view of the session, for the route guard and views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub initializing: bool,
    pub authenticated: bool,
    pub role: Option<Role>,
    pub institution_id: Option<InstitutionId>,
    pub employee_id: Option<EmployeeId>,
}

impl SessionSnapshot {
    /// The slice the route guard consumes.
    pub fn guard_state(&self) -> GuardState {
        GuardState {
            initializing: self.initializing,
            authenticated: self.authenticated,
            role: self.role,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    initializing: bool,
    authenticated: bool,
    /// Whether this session was established with a bearer credential (as
    /// opposed to riding on the cookie alone). When set, losing the
    /// credential — a 401 anywhere — ends the session.
    credential_issued: bool,
    role: Option<Role>,
    institution_id: Option<InstitutionId>,
    employee_id: Option<EmployeeId>,
}

/// Process-wide authentication context.
///
/// Owns the session fields exclusively: nothing else writes to the
/// [`SessionStore`] or the [`ApiClient`] credential slot.
pub struct AuthContext {
    api: ApiClient,
    store: SessionStore,
    state: RwLock<SessionState>,
    booted: AtomicBool,
}

impl AuthContext {
    /// Build the context, hydrating session fields from durable storage.
    ///
    /// Persisted values are advisory until the boot refresh confirms the
    /// session; the persisted role is re-validated on load.
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        let state = SessionState {
            initializing: true,
            authenticated: false,
            credential_issued: false,
            role: store.role(),
            institution_id: store.institution_id(),
            employee_id: store.employee_id(),
        };

        Self {
            api,
            store,
            state: RwLock::new(state),
            booted: AtomicBool::new(false),
        }
    }

    /// The shared request channel, for resource services.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Boot-time silent session restore. Run exactly once, before any
    /// guarded route decides; repeated calls (remounts) are no-ops that
    /// still leave `initializing` settled false.
    ///
    /// A failed refresh here is the normal "no prior session" case and is
    /// swallowed; interactive `refresh` calls do propagate their error.
    pub async fn bootstrap(&self) {
        if !self.booted.swap(true, Ordering::SeqCst) {
            if let Err(error) = self.refresh().await {
                tracing::debug!(%error, "no session restored at boot");
            }
        }
        self.state.write().unwrap().initializing = false;
    }

    /// Authenticate with the login endpoint and apply the response.
    ///
    /// On failure the local session is (re-)cleared defensively and the
    /// error is returned for the login form to display.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        match self.api.post::<Value, _>(LOGIN_ENDPOINT, credentials).await {
            Ok(response) => {
                self.apply_auth_response(&response);
                Ok(())
            }
            Err(error) => {
                self.clear_local_session();
                Err(error)
            }
        }
    }

    /// Register a new account; a successful signup is applied exactly
    /// like a login.
    pub async fn signup<B: Serialize + ?Sized>(&self, payload: &B) -> Result<(), ApiError> {
        match self.api.post::<Value, _>(SIGNUP_ENDPOINT, payload).await {
            Ok(response) => {
                self.apply_auth_response(&response);
                Ok(())
            }
            Err(error) => {
                self.clear_local_session();
                Err(error)
            }
        }
    }

    /// Renew the session off the ambient cookie (no token is sent).
    pub async fn refresh(&self) -> Result<(), ApiError> {
        match self.api.post_empty::<Value>(REFRESH_ENDPOINT).await {
            Ok(response) => {
                self.apply_auth_response(&response);
                Ok(())
            }
            Err(error) => {
                self.clear_local_session();
                Err(error)
            }
        }
    }

    /// End the session. The remote call is best-effort: local cleanup
    /// happens whether or not it succeeds, then any remote error is
    /// still reported.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.api.post_empty::<Value>(LOGOUT_ENDPOINT).await;
        self.clear_local_session();
        result.map(|_| ())
    }

    /// Current session state.
    ///
    /// `authenticated` accounts for a credential lost to a 401 on any
    /// request since the last state change: the next guard evaluation
    /// then redirects to login without an explicit logout.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().unwrap();
        let authenticated = state.authenticated
            && (!state.credential_issued || self.api.has_credential());

        SessionSnapshot {
            initializing: state.initializing,
            authenticated,
            role: state.role,
            institution_id: state.institution_id.clone(),
            employee_id: state.employee_id.clone(),
        }
    }

    /// Apply a successful auth response: install the credential, derive
    /// the session triple, persist what was derived, mark authenticated.
    ///
    /// Applying the same response twice lands in the same state.
    fn apply_auth_response(&self, response: &Value) {
        let derived = derive_session(response);

        if let Some(token) = &derived.token {
            self.api.set_credential(Some(token.clone()));
        }

        if derived.institution_id.is_some() {
            self.store.set_institution_id(derived.institution_id.as_ref());
        }
        if derived.role.is_some() {
            self.store.set_role(derived.role);
        }
        if derived.employee_id.is_some() {
            self.store.set_employee_id(derived.employee_id.as_ref());
        }

        let mut state = self.state.write().unwrap();
        state.authenticated = true;
        state.credential_issued = derived.token.is_some();
        if derived.role.is_some() {
            state.role = derived.role;
        }
        if derived.institution_id.is_some() {
            state.institution_id = derived.institution_id;
        }
        if derived.employee_id.is_some() {
            state.employee_id = derived.employee_id;
        }

        tracing::debug!(role = ?state.role, "auth response applied");
    }

    /// Unconditional local cleanup: credential first, then the persisted
    /// fields, then the in-memory state. `initializing` is untouched — it
    /// belongs to boot alone.
    fn clear_local_session(&self) {
        self.api.set_credential(None);
        self.store.clear();

        let mut state = self.state.write().unwrap();
        state.authenticated = false;
        state.credential_issued = false;
        state.role = None;
        state.institution_id = None;
        state.employee_id = None;
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::store::{MemoryStorage, ROLE_KEY, SessionStorage};
    use std::sync::Arc;

    fn context_with_storage(storage: Arc<MemoryStorage>) -> AuthContext {
        let api = ApiClient::new(&ClientConfig::new("http://127.0.0.1:9"));
        AuthContext::new(api, SessionStore::new(storage))
    }

    #[test]
    fn starts_initializing_and_unauthenticated() {
        let ctx = context_with_storage(Arc::new(MemoryStorage::new()));
        let snapshot = ctx.snapshot();
        assert!(snapshot.initializing);
        assert!(!snapshot.authenticated);
    }

    #[test]
    fn hydrates_fields_from_storage_but_not_authentication() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("institutionId", Some("inst-9"));
        storage.set(ROLE_KEY, Some("PUBLISHER"));
        storage.set("employeeId", Some("emp-1"));

        let ctx = context_with_storage(storage);
        let snapshot = ctx.snapshot();
        assert_eq!(snapshot.role, Some(Role::Publisher));
        assert_eq!(snapshot.institution_id.unwrap().as_str(), "inst-9");
        assert_eq!(snapshot.employee_id.unwrap().as_str(), "emp-1");
        assert!(!snapshot.authenticated);
    }

    #[test]
    fn invalid_persisted_role_hydrates_as_none() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(ROLE_KEY, Some("SUPERADMIN"));

        let ctx = context_with_storage(storage);
        assert_eq!(ctx.snapshot().role, None);
    }

    #[test]
    fn applying_a_response_authenticates_and_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = context_with_storage(storage.clone());

        ctx.apply_auth_response(&serde_json::json!({
            "accessToken": "opaque",
            "id": "emp-2",
            "role": "PUBLISHER",
            "institution": { "id": "inst-3" },
        }));

        let snapshot = ctx.snapshot();
        assert!(snapshot.authenticated);
        assert_eq!(snapshot.role, Some(Role::Publisher));
        assert!(ctx.api().has_credential());
        assert_eq!(storage.get(ROLE_KEY).as_deref(), Some("PUBLISHER"));
        assert_eq!(storage.get("institutionId").as_deref(), Some("inst-3"));
        assert_eq!(storage.get("employeeId").as_deref(), Some("emp-2"));
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = context_with_storage(storage.clone());
        let response = serde_json::json!({ "id": "emp-2", "role": "ADMIN" });

        ctx.apply_auth_response(&response);
        let first = ctx.snapshot();
        let first_role = storage.get(ROLE_KEY);

        ctx.apply_auth_response(&response);
        assert_eq!(ctx.snapshot(), first);
        assert_eq!(storage.get(ROLE_KEY), first_role);
    }

    #[test]
    fn tokenless_session_survives_without_credential() {
        // Cookie-backed session: authenticated with no bearer header.
        let ctx = context_with_storage(Arc::new(MemoryStorage::new()));
        ctx.apply_auth_response(&serde_json::json!({ "id": "emp-2", "role": "PUBLISHER" }));

        let snapshot = ctx.snapshot();
        assert!(snapshot.authenticated);
        assert!(!ctx.api().has_credential());
    }

    #[test]
    fn losing_an_issued_credential_deauthenticates() {
        let ctx = context_with_storage(Arc::new(MemoryStorage::new()));
        ctx.apply_auth_response(&serde_json::json!({ "accessToken": "opaque", "role": "ADMIN" }));
        assert!(ctx.snapshot().authenticated);

        // What the 401 interceptor does, from the context's perspective.
        ctx.api().set_credential(None);
        assert!(!ctx.snapshot().authenticated);
    }

    #[test]
    fn cleanup_clears_credential_fields_and_state() {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = context_with_storage(storage.clone());
        ctx.apply_auth_response(&serde_json::json!({
            "accessToken": "opaque",
            "id": "emp-2",
            "role": "ADMIN",
            "institutionId": "inst-1",
        }));

        ctx.clear_local_session();

        let snapshot = ctx.snapshot();
        assert!(!snapshot.authenticated);
        assert_eq!(snapshot.role, None);
        assert_eq!(snapshot.institution_id, None);
        assert_eq!(snapshot.employee_id, None);
        assert!(!ctx.api().has_credential());
        assert_eq!(storage.get(ROLE_KEY), None);
        assert_eq!(storage.get("institutionId"), None);
        assert_eq!(storage.get("employeeId"), None);
    }
}
