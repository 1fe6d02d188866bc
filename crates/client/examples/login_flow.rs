//! End-to-end login walkthrough against a live API.
//!
//! ```text
//! WISAL_API_URL=https://api.example \
//! WISAL_EMAIL=admin@example.com WISAL_PASSWORD=... \
//! cargo run -p wisal-client --example login_flow
//! ```

use std::sync::Arc;

use anyhow::Context as _;

use wisal_auth::route_access;
use wisal_client::{ApiClient, AuthContext, ClientConfig, Credentials, FileStorage, SessionStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    wisal_observability::init();

    let config = ClientConfig::from_env();
    let api = ApiClient::new(&config);
    let store = SessionStore::new(Arc::new(FileStorage::open_default()));
    let ctx = AuthContext::new(api, store);

    // Silent restore first; fall back to an interactive login.
    ctx.bootstrap().await;

    if !ctx.snapshot().authenticated {
        let credentials = Credentials {
            email: std::env::var("WISAL_EMAIL").context("WISAL_EMAIL not set")?,
            password: std::env::var("WISAL_PASSWORD").context("WISAL_PASSWORD not set")?,
        };
        ctx.login(&credentials)
            .await
            .with_context(|| "login rejected")?;
    }

    let snapshot = ctx.snapshot();
    tracing::info!(
        role = ?snapshot.role,
        institution = ?snapshot.institution_id,
        employee = ?snapshot.employee_id,
        "session established"
    );

    let decision = route_access(&snapshot.guard_state(), &[]);
    tracing::info!(?decision, "guard decision for an authenticated route");

    Ok(())
}
