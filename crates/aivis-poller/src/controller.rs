//! Poll session lifecycle.
//!
//! A controller runs at most one session. Each session is one spawned tokio
//! task that alternates between a fetch and a sleep. The session's mutable
//! state sits behind a `std::sync::Mutex` together with the observer, and a
//! `live` flag gates every delivery. [`PollController::cancel`] clears `live`
//! under that same lock before aborting the task, so once it returns the
//! observer is never called again for that session, even if a fetch that was
//! already in flight resolves.
//!
//! The observer runs while the session lock is held. It must not call back
//! into the controller. An observer that panics ends its session as
//! [`PollState::Failed`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use aivis_client::{
    normalize_envelope, retry_with_backoff, AnalysisStatus, AnalyticsEnvelope, AnalyticsView,
    ClientError,
};
use tokio::task::JoinHandle;

use crate::error::PollError;
use crate::policy::PollPolicy;
use crate::request::AnalyticsRequest;
use crate::source::AnalyticsSource;
use crate::update::PollUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    Completed,
    Cancelled,
    Failed,
}

impl PollState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PollState::Completed | PollState::Cancelled | PollState::Failed
        )
    }
}

/// Receives every update of a session, in attempt order.
///
/// Implemented for any `FnMut(PollUpdate) + Send` closure.
pub trait PollObserver: Send + 'static {
    fn on_update(&mut self, update: PollUpdate);
}

impl<F> PollObserver for F
where
    F: FnMut(PollUpdate) + Send + 'static,
{
    fn on_update(&mut self, update: PollUpdate) {
        self(update);
    }
}

struct SessionState {
    id: u64,
    live: bool,
    state: PollState,
    attempt: u32,
    last_view: Option<AnalyticsView>,
    observer: Box<dyn PollObserver>,
}

impl SessionState {
    /// Hands `update` to the observer. Returns `false` if the session is no
    /// longer live afterwards.
    fn deliver(&mut self, update: PollUpdate) -> bool {
        if !self.live {
            return false;
        }
        let observer = &mut self.observer;
        if panic::catch_unwind(AssertUnwindSafe(|| observer.on_update(update))).is_err() {
            tracing::error!(session_id = self.id, "poll observer panicked; session failed");
            self.finish(PollState::Failed);
            return false;
        }
        true
    }

    fn finish(&mut self, state: PollState) {
        self.state = state;
        self.live = false;
    }
}

fn lock(shared: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fails a session whose task exits while it is still live.
struct Teardown<'a>(&'a Mutex<SessionState>);

impl Drop for Teardown<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.0);
        if state.live {
            tracing::error!(session_id = state.id, "poll task ended unexpectedly");
            state.finish(PollState::Failed);
        }
    }
}

struct PollSession {
    id: u64,
    shared: Arc<Mutex<SessionState>>,
    task: JoinHandle<()>,
}

impl PollSession {
    /// Stops the session. Returns `false` if it had already ended.
    fn cancel(&self) -> bool {
        let was_live = {
            let mut state = lock(&self.shared);
            let was_live = state.live;
            if was_live {
                state.finish(PollState::Cancelled);
            }
            was_live
        };
        self.task.abort();
        was_live
    }
}

/// Polls one entity's analytics until completion, failure or cancellation.
///
/// Dropping the controller cancels its session.
pub struct PollController<S> {
    source: Arc<S>,
    policy: PollPolicy,
    next_id: u64,
    session: Option<PollSession>,
}

impl<S> PollController<S>
where
    S: AnalyticsSource + 'static,
{
    #[must_use]
    pub fn new(source: S, policy: PollPolicy) -> Self {
        Self::from_shared(Arc::new(source), policy)
    }

    /// Builds a controller around a source the caller keeps a handle to.
    #[must_use]
    pub fn from_shared(source: Arc<S>, policy: PollPolicy) -> Self {
        Self {
            source,
            policy,
            next_id: 0,
            session: None,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Starts a new session, replacing any current one, and returns its id.
    ///
    /// The first fetch is issued immediately on the runtime.
    ///
    /// # Errors
    ///
    /// - [`PollError::Validation`] if the entity id or token is blank. No
    ///   request is sent and the current session, if any, keeps running.
    /// - [`PollError::NoRuntime`] when called outside a tokio runtime.
    pub fn start<O>(&mut self, request: AnalyticsRequest, observer: O) -> Result<u64, PollError>
    where
        O: PollObserver,
    {
        if let Err(err) = request.validate() {
            tracing::warn!(entity = %request.entity, error = %err, "analytics poll not started");
            return Err(err);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| PollError::NoRuntime)?;

        if let Some(previous) = self.session.take() {
            if previous.cancel() {
                tracing::debug!(session_id = previous.id, "poll session replaced");
            }
        }

        self.next_id += 1;
        let id = self.next_id;
        let shared = Arc::new(Mutex::new(SessionState {
            id,
            live: true,
            state: PollState::Polling,
            attempt: 0,
            last_view: None,
            observer: Box::new(observer),
        }));

        tracing::info!(
            session_id = id,
            entity = %request.entity,
            date = %request.date,
            "analytics poll started"
        );
        let task = runtime.spawn(run_session(
            Arc::clone(&self.source),
            self.policy.clone(),
            request,
            Arc::clone(&shared),
        ));
        self.session = Some(PollSession { id, shared, task });
        Ok(id)
    }
}

impl<S> PollController<S> {
    /// Stops the current session. No observer callback runs after this
    /// returns. A session that already finished keeps its terminal state.
    pub fn cancel(&mut self) {
        if let Some(session) = &self.session {
            if session.cancel() {
                tracing::info!(session_id = session.id, "analytics poll cancelled");
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> PollState {
        self.session
            .as_ref()
            .map_or(PollState::Idle, |s| lock(&s.shared).state)
    }

    /// Last successfully normalized snapshot of the current session.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<AnalyticsView> {
        self.session
            .as_ref()
            .and_then(|s| lock(&s.shared).last_view.clone())
    }

    /// Index of the most recent attempt of the current session.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| lock(&s.shared).attempt)
    }

    #[must_use]
    pub fn session_id(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.id)
    }
}

impl<S> Drop for PollController<S> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancel();
        }
    }
}

async fn run_session<S>(
    source: Arc<S>,
    policy: PollPolicy,
    request: AnalyticsRequest,
    shared: Arc<Mutex<SessionState>>,
) where
    S: AnalyticsSource + ?Sized,
{
    let session_id = lock(&shared).id;
    let _teardown = Teardown(&shared);
    let mut attempt: u32 = 0;

    loop {
        if !begin_attempt(&shared, attempt) {
            return;
        }
        tracing::debug!(session_id, attempt, entity = %request.entity, "fetching analytics");

        let keep_polling = match fetch(source.as_ref(), &policy, &request).await {
            Ok(envelope) => on_envelope(&shared, &policy, attempt, &envelope),
            Err(error) => {
                on_fetch_error(&shared, attempt, error);
                false
            }
        };
        if !keep_polling {
            return;
        }

        tokio::time::sleep(policy.delay_after(attempt)).await;
        attempt = attempt.saturating_add(1);
    }
}

fn begin_attempt(shared: &Mutex<SessionState>, attempt: u32) -> bool {
    let mut state = lock(shared);
    if !state.live {
        return false;
    }
    state.attempt = attempt;
    true
}

async fn fetch<S>(
    source: &S,
    policy: &PollPolicy,
    request: &AnalyticsRequest,
) -> Result<AnalyticsEnvelope, ClientError>
where
    S: AnalyticsSource + ?Sized,
{
    let deadline = policy.request_timeout;
    retry_with_backoff(
        policy.fetch_retries,
        policy.retry_backoff_base_ms,
        move || async move {
            tokio::time::timeout(
                deadline,
                source.fetch_analytics(
                    &request.entity,
                    request.date,
                    &request.session.access_token,
                ),
            )
            .await
            .unwrap_or_else(|_| {
                Err(ClientError::Timeout {
                    after_ms: millis(deadline),
                })
            })
        },
    )
    .await
}

/// Delivers the snapshot and decides whether another attempt follows.
fn on_envelope(
    shared: &Mutex<SessionState>,
    policy: &PollPolicy,
    attempt: u32,
    envelope: &AnalyticsEnvelope,
) -> bool {
    let view = normalize_envelope(Some(envelope));
    let status = view.status;
    let reason = view.analytics.reason_missing.clone();

    let mut state = lock(shared);
    if !state.live {
        return false;
    }
    let session_id = state.id;
    state.last_view = Some(view.clone());
    if !state.deliver(PollUpdate::Snapshot { attempt, view }) {
        return false;
    }

    match status {
        AnalysisStatus::Completed => {
            tracing::info!(session_id, attempt, "analytics completed");
            state.finish(PollState::Completed);
            false
        }
        AnalysisStatus::Failed => {
            tracing::warn!(session_id, attempt, reason = ?reason, "backend reported analysis failure");
            state.deliver(PollUpdate::Failed {
                attempt,
                error: PollError::AnalysisFailed { reason },
            });
            state.finish(PollState::Failed);
            false
        }
        AnalysisStatus::Pending | AnalysisStatus::Processing => {
            let attempts = attempt.saturating_add(1);
            if policy.is_exhausted(attempts) {
                tracing::warn!(session_id, attempts, "analytics still in progress, giving up");
                state.deliver(PollUpdate::Failed {
                    attempt,
                    error: PollError::AttemptsExhausted { attempts },
                });
                state.finish(PollState::Failed);
                return false;
            }
            true
        }
    }
}

fn on_fetch_error(shared: &Mutex<SessionState>, attempt: u32, error: ClientError) {
    let mut state = lock(shared);
    if !state.live {
        return;
    }
    tracing::warn!(session_id = state.id, attempt, error = %error, "analytics fetch failed");
    state.deliver(PollUpdate::Failed {
        attempt,
        error: PollError::Fetch(error),
    });
    state.finish(PollState::Failed);
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
