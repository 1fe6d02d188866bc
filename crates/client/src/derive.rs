//! Session derivation from heterogeneous auth responses.
//!
//! Login/refresh/signup responses differ in shape across the API: the
//! session fields may ride inside the token's claims, at the top level,
//! or nested under `institution`/`user` objects. Each field is resolved
//! through an explicit ordered extractor list so the precedence (claims
//! first, then declared fallbacks) is testable in isolation. Derivation
//! is pure — persisting the result is the context's job.

use serde_json::{Map, Value};

use wisal_auth::{Role, UnverifiedClaims};
use wisal_core::{EmployeeId, InstitutionId};

type Body = Map<String, Value>;

/// The session triple (plus credential) as derived from one response.
///
/// A `None` field means no source in the response supplied it — not an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedSession {
    pub token: Option<String>,
    pub role: Option<Role>,
    pub institution_id: Option<InstitutionId>,
    pub employee_id: Option<EmployeeId>,
}

/// Ordered credential sources; first non-empty string wins.
const TOKEN_SOURCES: &[fn(&Body) -> Option<String>] = &[token_access_token, token_plain];

/// Ordered institution-id fallbacks (applied only when the claims did not
/// supply one): top-level field, nested institution object, nested user.
const INSTITUTION_SOURCES: &[fn(&Body) -> Option<String>] = &[
    institution_top_level,
    institution_nested_object,
    institution_via_user,
];

/// Ordered role fallbacks; values outside the role set are discarded.
const ROLE_SOURCES: &[fn(&Body) -> Option<Role>] = &[role_top_level, role_via_user];

/// Ordered employee-id fallbacks.
const EMPLOYEE_SOURCES: &[fn(&Body) -> Option<String>] = &[employee_top_level, employee_via_user];

fn token_access_token(body: &Body) -> Option<String> {
    non_empty(body.get("accessToken"))
}

fn token_plain(body: &Body) -> Option<String> {
    non_empty(body.get("token"))
}

fn institution_top_level(body: &Body) -> Option<String> {
    non_empty(body.get("institutionId"))
}

fn institution_nested_object(body: &Body) -> Option<String> {
    non_empty(nested(body, "institution", "id"))
}

fn institution_via_user(body: &Body) -> Option<String> {
    non_empty(nested(body, "user", "institutionId"))
}

fn role_top_level(body: &Body) -> Option<Role> {
    parse_role(body.get("role"))
}

fn role_via_user(body: &Body) -> Option<Role> {
    parse_role(nested(body, "user", "role"))
}

fn employee_top_level(body: &Body) -> Option<String> {
    non_empty(body.get("id"))
}

fn employee_via_user(body: &Body) -> Option<String> {
    non_empty(nested(body, "user", "id"))
}

/// Derive the session triple (and credential) from an auth response.
///
/// A non-object response derives nothing — a no-op, not an error.
pub fn derive_session(response: &Value) -> DerivedSession {
    let Some(body) = response.as_object() else {
        return DerivedSession::default();
    };

    let token = first(body, TOKEN_SOURCES);
    let claims = token.as_deref().and_then(UnverifiedClaims::from_token);

    // Claims win; the shape fallbacks only fill gaps.
    let (mut role, mut institution_id, mut employee_id) = match &claims {
        Some(claims) => (
            claims.role,
            claims.institution_id.clone(),
            claims.subject.clone(),
        ),
        None => (None, None, None),
    };

    if institution_id.is_none() {
        institution_id =
            first(body, INSTITUTION_SOURCES).and_then(|raw| InstitutionId::new(raw).ok());
    }
    if role.is_none() {
        role = first(body, ROLE_SOURCES);
    }
    if employee_id.is_none() {
        employee_id = first(body, EMPLOYEE_SOURCES).and_then(|raw| EmployeeId::new(raw).ok());
    }

    DerivedSession {
        token,
        role,
        institution_id,
        employee_id,
    }
}

fn first<T>(body: &Body, sources: &[fn(&Body) -> Option<T>]) -> Option<T> {
    sources.iter().find_map(|source| source(body))
}

fn nested<'a>(body: &'a Body, outer: &str, inner: &str) -> Option<&'a Value> {
    body.get(outer)?.as_object()?.get(inner)
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn parse_role(value: Option<&Value>) -> Option<Role> {
    value.and_then(Value::as_str).and_then(Role::parse)
}
