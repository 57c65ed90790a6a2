//! Request Controller - single-flight enhancement requests
//!
//! Tracks the one outstanding generation call and what the user currently
//! sees (result or error). Every accepted trigger gets a new epoch; a
//! resolution whose epoch is no longer current is dropped.
//!
//! ```text
//! Idle ──trigger──▶ InFlight ──success──▶ Succeeded ──trigger──▶ InFlight
//!                      │  └──failure──▶ Failed ─────trigger──▶ InFlight
//!                      └──cancel──▶ Idle
//! ```

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::{errors::RequestError, GeminiModel, HistoryEntry};
use crate::ports::PromptEnhancer;
use crate::store::{HistoryCollection, SettingsRecord, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Idle => write!(f, "idle"),
            RequestStatus::InFlight => write!(f, "in flight"),
            RequestStatus::Succeeded => write!(f, "succeeded"),
            RequestStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Handle for one accepted trigger
///
/// Carries the prompt and the settings captured when the request started.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    epoch: u64,
    prompt: String,
    model: GeminiModel,
    system_instruction: String,
}

impl RequestTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> GeminiModel {
        self.model
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }
}

/// How a request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Result committed and recorded in history
    Enhanced(HistoryEntry),
    /// Error committed; history untouched
    Failed(RequestError),
    /// Resolution arrived for a superseded request and was dropped
    Stale,
    /// Trigger rejected: blank prompt or a request already in flight
    Ignored,
}

/// What the user currently sees
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub status: RequestStatus,
    pub epoch: u64,
    pub output: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct ControllerState {
    status: RequestStatus,
    epoch: u64,
    output: Option<String>,
    error: Option<String>,
}

impl ControllerState {
    fn abandon(&mut self) {
        self.epoch += 1;
        self.status = RequestStatus::Idle;
    }
}

/// Returns the controller to `Idle` if `epoch` is still in flight when
/// the owning `enhance` call is dropped mid-request
struct AbandonOnDrop<'a> {
    state: &'a Mutex<ControllerState>,
    epoch: u64,
}

impl Drop for AbandonOnDrop<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.epoch == self.epoch && state.status == RequestStatus::InFlight {
            state.abandon();
            info!(epoch = self.epoch, "Request dropped before completion; abandoned");
        }
    }
}

pub struct RequestController<P: ?Sized> {
    provider: Arc<P>,
    history: Arc<HistoryCollection>,
    settings: Arc<SettingsRecord>,
    timeout: Option<Duration>,
    state: Mutex<ControllerState>,
}

impl<P> RequestController<P>
where
    P: PromptEnhancer + ?Sized,
{
    pub fn new(provider: Arc<P>, store: &Store) -> Self {
        Self {
            provider,
            history: store.history.clone(),
            settings: store.settings.clone(),
            timeout: None,
            state: Mutex::new(ControllerState {
                status: RequestStatus::Idle,
                epoch: 0,
                output: None,
                error: None,
            }),
        }
    }

    /// Bound each provider call; expiry resolves as `RequestError::Timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Start a request if none is in flight and the prompt is not blank
    ///
    /// Rejected triggers are dropped, not queued.
    pub fn trigger(&self, prompt: &str) -> Option<RequestTicket> {
        if prompt.trim().is_empty() {
            debug!("Ignoring trigger with blank prompt");
            return None;
        }

        let mut state = self.lock();
        if state.status == RequestStatus::InFlight {
            debug!(epoch = state.epoch, "Ignoring trigger while a request is in flight");
            return None;
        }

        let settings = self.settings.current();
        state.epoch += 1;
        state.status = RequestStatus::InFlight;
        state.output = None;
        state.error = None;

        Some(RequestTicket {
            epoch: state.epoch,
            prompt: prompt.to_string(),
            model: settings.model,
            system_instruction: settings.system_instruction,
        })
    }

    /// Commit the result of `ticket`'s request, unless it was superseded
    pub fn resolve(&self, ticket: &RequestTicket, result: Result<String, RequestError>) -> Outcome {
        let mut state = self.lock();
        if state.epoch != ticket.epoch || state.status != RequestStatus::InFlight {
            warn!(
                ticket_epoch = ticket.epoch,
                current_epoch = state.epoch,
                "Dropping stale resolution"
            );
            return Outcome::Stale;
        }

        match result {
            Ok(enhanced) => {
                let entry = HistoryEntry::new(ticket.prompt.clone(), enhanced.clone());
                self.history.append(entry.clone());
                state.status = RequestStatus::Succeeded;
                state.output = Some(enhanced);
                state.error = None;
                info!(epoch = ticket.epoch, id = %entry.id, "Prompt enhanced");
                Outcome::Enhanced(entry)
            }
            Err(err) => {
                state.status = RequestStatus::Failed;
                state.output = None;
                state.error = Some(err.to_string());
                warn!(epoch = ticket.epoch, error = %err, "Enhancement failed");
                Outcome::Failed(err)
            }
        }
    }

    /// Trigger, call the provider, resolve
    ///
    /// Dropping the returned future before it completes abandons the
    /// request the same way `cancel` does, so later triggers are accepted.
    pub async fn enhance(&self, prompt: &str) -> Outcome {
        let Some(ticket) = self.trigger(prompt) else {
            return Outcome::Ignored;
        };
        let _abandon = AbandonOnDrop {
            state: &self.state,
            epoch: ticket.epoch,
        };

        let call = self
            .provider
            .enhance(&ticket.prompt, ticket.model, &ticket.system_instruction);

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(RequestError::Timeout(limit.as_secs())),
            },
            None => call.await,
        };

        self.resolve(&ticket, result)
    }

    /// Abandon the in-flight request; its resolution will be dropped
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        if state.status != RequestStatus::InFlight {
            return false;
        }
        state.abandon();
        info!(epoch = state.epoch, "Cancelled in-flight request");
        true
    }

    /// Show a history entry's result without generating anything
    pub fn load_history_entry(&self, entry: &HistoryEntry) {
        let mut state = self.lock();
        state.output = Some(entry.enhanced_prompt.clone());
        state.error = None;
    }

    /// Clear the displayed result after a template is selected
    pub fn load_template(&self) {
        let mut state = self.lock();
        state.output = None;
        state.error = None;
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let state = self.lock();
        ControllerSnapshot {
            status: state.status,
            epoch: state.epoch,
            output: state.output.clone(),
            error: state.error.clone(),
        }
    }

    pub fn status(&self) -> RequestStatus {
        self.lock().status
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Echoes the prompt back, optionally failing or waiting for a signal
    struct ScriptedEnhancer {
        calls: AtomicUsize,
        fail_with: Option<RequestError>,
        gate: Option<Notify>,
    }

    impl ScriptedEnhancer {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: None,
                gate: None,
            }
        }

        fn failing(err: RequestError) -> Self {
            Self {
                fail_with: Some(err),
                ..Self::ok()
            }
        }

        fn gated() -> Self {
            Self {
                gate: Some(Notify::new()),
                ..Self::ok()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PromptEnhancer for ScriptedEnhancer {
        async fn enhance(
            &self,
            prompt: &str,
            model: GeminiModel,
            _system_instruction: &str,
        ) -> Result<String, RequestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(format!("[{}] enhanced: {}", model, prompt)),
            }
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }
    }

    fn setup(provider: ScriptedEnhancer) -> (Store, Arc<RequestController<ScriptedEnhancer>>) {
        let store = Store::open(Arc::new(MemoryStore::new()));
        let controller = Arc::new(RequestController::new(Arc::new(provider), &store));
        (store, controller)
    }

    #[tokio::test]
    async fn test_success_appends_history() {
        let (store, controller) = setup(ScriptedEnhancer::ok());

        let outcome = controller.enhance("write a haiku").await;
        let Outcome::Enhanced(entry) = outcome else {
            panic!("Expected Enhanced, got {:?}", outcome);
        };

        assert_eq!(entry.original_prompt, "write a haiku");
        assert_eq!(entry.enhanced_prompt, "[gemini-2.5-pro] enhanced: write a haiku");

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.status, RequestStatus::Succeeded);
        assert_eq!(snapshot.output.as_deref(), Some(entry.enhanced_prompt.as_str()));
        assert_eq!(snapshot.error, None);
        assert_eq!(store.history.entries(), vec![entry]);
    }

    #[tokio::test]
    async fn test_failure_leaves_history_untouched() {
        let (store, controller) = setup(ScriptedEnhancer::failing(RequestError::EmptyResponse));

        let outcome = controller.enhance("write a haiku").await;
        assert_eq!(outcome, Outcome::Failed(RequestError::EmptyResponse));

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.status, RequestStatus::Failed);
        assert_eq!(snapshot.output, None);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("The model returned an empty response.")
        );
        assert!(store.history.is_empty());
    }

    #[tokio::test]
    async fn test_blank_prompt_ignored() {
        let (_, controller) = setup(ScriptedEnhancer::ok());
        assert_eq!(controller.enhance("   \n").await, Outcome::Ignored);
        assert_eq!(controller.status(), RequestStatus::Idle);
        assert_eq!(controller.provider().calls(), 0);
    }

    #[tokio::test]
    async fn test_second_trigger_while_in_flight_is_dropped() {
        let (store, controller) = setup(ScriptedEnhancer::gated());

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.enhance("P1").await })
        };

        while controller.provider().calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(controller.status(), RequestStatus::InFlight);

        assert_eq!(controller.enhance("P2").await, Outcome::Ignored);
        assert_eq!(controller.provider().calls(), 1);

        if let Some(gate) = &controller.provider().gate {
            gate.notify_one();
        }
        let outcome = first.await.unwrap();
        assert!(matches!(outcome, Outcome::Enhanced(ref e) if e.original_prompt == "P1"));
        assert_eq!(controller.provider().calls(), 1);
        assert_eq!(store.history.len(), 1);
    }

    #[test]
    fn test_stale_resolution_is_dropped() {
        let (store, controller) = setup(ScriptedEnhancer::ok());

        let slow = controller.trigger("slow").unwrap();
        assert!(controller.trigger("blocked").is_none());
        assert!(controller.cancel());

        let fast = controller.trigger("fast").unwrap();
        assert!(fast.epoch() > slow.epoch());

        let outcome = controller.resolve(&fast, Ok("fast result".to_string()));
        assert!(matches!(outcome, Outcome::Enhanced(_)));

        let outcome = controller.resolve(&slow, Ok("slow result".to_string()));
        assert_eq!(outcome, Outcome::Stale);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.output.as_deref(), Some("fast result"));
        let history = store.history.entries();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].original_prompt, "fast");
    }

    #[test]
    fn test_stale_failure_does_not_clobber_result() {
        let (_, controller) = setup(ScriptedEnhancer::ok());

        let old = controller.trigger("old").unwrap();
        controller.cancel();
        let new = controller.trigger("new").unwrap();
        controller.resolve(&new, Ok("new result".to_string()));

        let outcome = controller.resolve(&old, Err(RequestError::Backend("boom".to_string())));
        assert_eq!(outcome, Outcome::Stale);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.status, RequestStatus::Succeeded);
        assert_eq!(snapshot.error, None);
    }

    #[test]
    fn test_new_trigger_supersedes_displayed_result() {
        let (_, controller) = setup(ScriptedEnhancer::ok());

        let ticket = controller.trigger("one").unwrap();
        controller.resolve(&ticket, Err(RequestError::EmptyResponse));
        assert_eq!(controller.status(), RequestStatus::Failed);

        let ticket = controller.trigger("two").unwrap();
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.status, RequestStatus::InFlight);
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.output, None);
        assert_eq!(ticket.prompt(), "two");
    }

    #[test]
    fn test_ticket_captures_settings() {
        let (store, controller) = setup(ScriptedEnhancer::ok());
        let mut settings = store.settings.current();
        settings.model = GeminiModel::Flash;
        settings.system_instruction = "be brief".to_string();
        store.settings.save(settings);

        let ticket = controller.trigger("x").unwrap();
        assert_eq!(ticket.model(), GeminiModel::Flash);
        assert_eq!(ticket.system_instruction(), "be brief");
    }

    #[test]
    fn test_load_resets_display_without_new_epoch() {
        let (_, controller) = setup(ScriptedEnhancer::ok());

        let ticket = controller.trigger("x").unwrap();
        controller.resolve(&ticket, Err(RequestError::EmptyResponse));
        let epoch = controller.snapshot().epoch;

        let entry = HistoryEntry::new("old prompt", "old result");
        controller.load_history_entry(&entry);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.output.as_deref(), Some("old result"));
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.epoch, epoch);

        controller.load_template();
        assert_eq!(controller.snapshot().output, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_resolves_as_failure() {
        let store = Store::open(Arc::new(MemoryStore::new()));
        let controller = RequestController::new(Arc::new(ScriptedEnhancer::gated()), &store)
            .with_timeout(Duration::from_secs(30));

        let outcome = controller.enhance("never answered").await;
        assert_eq!(outcome, Outcome::Failed(RequestError::Timeout(30)));
        assert_eq!(controller.status(), RequestStatus::Failed);
        assert!(store.history.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_enhance_releases_in_flight_slot() {
        let (store, controller) = setup(ScriptedEnhancer::gated());

        {
            let call = controller.enhance("abandoned");
            tokio::pin!(call);
            let waited = tokio::time::timeout(Duration::from_secs(1), &mut call).await;
            assert!(waited.is_err());
            assert_eq!(controller.status(), RequestStatus::InFlight);
        }

        assert_eq!(controller.status(), RequestStatus::Idle);
        assert_eq!(controller.snapshot().epoch, 2);
        assert!(controller.trigger("next").is_some());
        assert!(store.history.is_empty());
    }

    #[tokio::test]
    async fn test_completed_enhance_keeps_its_result() {
        let (_, controller) = setup(ScriptedEnhancer::ok());

        controller.enhance("kept").await;
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.status, RequestStatus::Succeeded);
        assert_eq!(snapshot.epoch, 1);
    }

    #[test]
    fn test_cancel_when_idle_is_noop() {
        let (_, controller) = setup(ScriptedEnhancer::ok());
        assert!(!controller.cancel());
        assert_eq!(controller.snapshot().epoch, 0);
    }
}
