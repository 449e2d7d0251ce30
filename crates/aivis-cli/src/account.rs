//! `login` and `register` handlers.
//!
//! The session is printed as shell `export` lines; persisting it is left to
//! the user's shell or `.env` file.

use aivis_client::{AnalyticsClient, RegisterRequest};
use aivis_core::AuthSession;

/// Shell lines that make later commands pick up `session`.
pub(crate) fn export_lines(session: &AuthSession) -> Vec<String> {
    let mut lines = vec![format!("export AIVIS_ACCESS_TOKEN={}", session.access_token)];
    if let Some(app) = &session.application_id {
        lines.push(format!("export AIVIS_APPLICATION_ID={app}"));
    }
    lines
}

fn print_session(session: &AuthSession) {
    if session.application_id.is_none() {
        eprintln!("warning: the account owns no application; create-product will need one");
    }
    for line in export_lines(session) {
        println!("{line}");
    }
}

/// # Errors
///
/// Returns an error if the backend rejects the credentials or is unreachable.
pub(crate) async fn run_login(
    client: &AnalyticsClient,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let session = client.login(email, password).await?;
    print_session(&session);
    Ok(())
}

/// # Errors
///
/// Returns an error if registration fails.
pub(crate) async fn run_register(
    client: &AnalyticsClient,
    request: &RegisterRequest,
) -> anyhow::Result<()> {
    let session = client.register(request).await?;
    print_session(&session);
    Ok(())
}
