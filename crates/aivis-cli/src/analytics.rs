//! `generate` and `watch` handlers.

use aivis_client::{normalize_envelope, AnalyticsClient, EntityRef};
use aivis_core::AuthSession;
use aivis_poller::{AnalyticsRequest, PollController, PollPolicy, PollState, PollUpdate};
use chrono::{NaiveDate, Utc};

use crate::render;

/// # Errors
///
/// Returns an error if the backend call fails.
pub(crate) async fn run_generate(
    client: &AnalyticsClient,
    session: &AuthSession,
    entity: &EntityRef,
    date: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let envelope = client
        .generate_analytics(entity, date, &session.access_token)
        .await?;
    let view = normalize_envelope(Some(&envelope));
    println!("generation requested for {entity} on {date}: {}", view.status);
    Ok(())
}

/// Polls until the analytics complete, printing every snapshot.
///
/// Ctrl-C cancels the session; no output follows the cancellation.
///
/// # Errors
///
/// Returns an error if the poll fails or cannot be started.
pub(crate) async fn run_watch(
    client: AnalyticsClient,
    policy: PollPolicy,
    request: AnalyticsRequest,
    json: bool,
) -> anyhow::Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<PollUpdate>();
    let mut controller = PollController::new(client, policy);
    controller.start(request, move |update| {
        tx.send(update).ok();
    })?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut failure = None;
    loop {
        tokio::select! {
            update = rx.recv() => {
                let Some(update) = update else { break };
                let terminal = update.is_terminal();
                match update {
                    PollUpdate::Snapshot { attempt, view } => {
                        if json {
                            println!("{}", serde_json::to_string_pretty(&view)?);
                        } else {
                            print!("{}", render::snapshot(attempt, &view));
                        }
                    }
                    PollUpdate::Failed { attempt, error } => {
                        eprintln!("{}", render::failure(attempt, &error));
                        failure = Some(error);
                    }
                }
                if terminal {
                    break;
                }
            }
            signal = &mut ctrl_c => {
                signal?;
                controller.cancel();
                eprintln!("cancelled");
                break;
            }
        }
    }

    match (controller.state(), failure) {
        (PollState::Failed, Some(error)) => Err(error.into()),
        _ => Ok(()),
    }
}
