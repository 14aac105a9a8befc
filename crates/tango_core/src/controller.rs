use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use time::Date;
use tokio::task::{AbortHandle, JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::draft::{Draft, SubmittedDraft};
use crate::model::{IdSource, Suggestion, Task, TaskId};
use crate::notify::{Notice, Notifier};
use crate::store::TaskStore;
use crate::suggest::{SuggestionClient, SuggestionError};

/// How resolved suggestions update the shared `last_suggestion` slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionPolicy {
    /// Every successful result overwrites the slot, in resolution order.
    #[default]
    #[serde(alias = "last_resolved", alias = "resolved")]
    LastResolved,
    /// Only the most recently dispatched request may write the slot.
    #[serde(alias = "latest_submission", alias = "latest-submission")]
    Latest,
}

impl SuggestionPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "last-resolved" | "resolved" => Some(Self::LastResolved),
            "latest" | "latest-submission" => Some(Self::Latest),
            _ => None,
        }
    }
}

/// Identifies one dispatched suggestion request. Tokens increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub task: Task,
    pub token: RequestToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Written to the shared slot.
    Applied(Suggestion),
    /// Recorded for its task only; a newer request owns the shared slot.
    Superseded(Suggestion),
    Failed,
}

/// A resolved request after it has been applied to controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub token: RequestToken,
    pub task_id: TaskId,
    pub resolution: Resolution,
}

struct Completed {
    token: RequestToken,
    task_id: TaskId,
    result: Result<Suggestion, SuggestionError>,
}

struct InFlight {
    task_id: TaskId,
    abort: AbortHandle,
}

pub struct ViewController {
    store: TaskStore,
    draft: Draft,
    client: Arc<dyn SuggestionClient>,
    notifier: Box<dyn Notifier>,
    policy: SuggestionPolicy,
    per_task: HashMap<TaskId, Suggestion>,
    requests: JoinSet<Completed>,
    in_flight: BTreeMap<RequestToken, InFlight>,
    issued: u64,
}

impl ViewController {
    pub fn new(client: Arc<dyn SuggestionClient>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            store: TaskStore::default(),
            draft: Draft::default(),
            client,
            notifier,
            policy: SuggestionPolicy::default(),
            per_task: HashMap::new(),
            requests: JoinSet::new(),
            in_flight: BTreeMap::new(),
            issued: 0,
        }
    }

    /// Replaces the id source. Only meaningful before the first submission.
    pub fn with_ids<I: IdSource + 'static>(mut self, ids: I) -> Self {
        self.store = TaskStore::new(ids);
        self
    }

    pub fn with_policy(mut self, policy: SuggestionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn set_draft_text<S: Into<String>>(&mut self, text: S) {
        self.draft.set_text(text);
    }

    pub fn select_date(&mut self, date: Option<Date>) {
        self.draft.select_date(date);
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.list()
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn last_suggestion(&self) -> Option<&Suggestion> {
        self.draft.last_suggestion()
    }

    /// Latest successful suggestion produced for the given task.
    pub fn suggestion_for(&self, id: &TaskId) -> Option<&Suggestion> {
        self.per_task.get(id)
    }

    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// UI hint only; submissions are accepted while busy.
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Commits the draft as a new task and dispatches its suggestion request.
    ///
    /// A blank draft is ignored entirely and returns `None`. Must be called
    /// from within a tokio runtime.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.draft.is_blank() {
            debug!("submit: blank draft ignored");
            return None;
        }

        let SubmittedDraft { text, deadline } = self.draft.take();
        let task = self.store.append(&text, deadline);
        let token = self.dispatch(task.id.clone(), text);
        info!(task_id = %task.id, %token, pending = self.in_flight.len(), "submit: task added");

        Some(Submission { task, token })
    }

    pub fn toggle_completed(&mut self, id: &TaskId) -> Option<Task> {
        let toggled = self.store.toggle_completed(id);
        debug!(task_id = %id, found = toggled.is_some(), "toggle_completed");
        toggled
    }

    /// Removes a task. In-flight requests for it keep running.
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let removed = self.store.remove(id);
        if removed.is_some() {
            self.per_task.remove(id);
        }
        debug!(task_id = %id, found = removed.is_some(), "remove");
        removed
    }

    /// Aborts one in-flight request. A cancelled request never updates state.
    pub fn cancel(&mut self, token: RequestToken) -> bool {
        match self.in_flight.remove(&token) {
            Some(in_flight) => {
                in_flight.abort.abort();
                debug!(%token, task_id = %in_flight.task_id, "cancel: request aborted");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) -> usize {
        let tokens: Vec<RequestToken> = self.in_flight.keys().copied().collect();
        tokens
            .into_iter()
            .filter(|token| self.cancel(*token))
            .count()
    }

    /// Waits for the next request to resolve and applies it.
    ///
    /// Returns `None` once nothing is pending. Cancel safe.
    pub async fn next_outcome(&mut self) -> Option<Outcome> {
        while !self.in_flight.is_empty() {
            let joined = self.requests.join_next().await;
            match joined {
                Some(joined) => {
                    if let Some(outcome) = self.absorb(joined) {
                        return Some(outcome);
                    }
                }
                None => {
                    warn!(pending = self.in_flight.len(), "next_outcome: request set drained unexpectedly");
                    self.in_flight.clear();
                }
            }
        }
        None
    }

    /// Applies every request that has already resolved, without waiting.
    pub fn try_apply_ready(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        loop {
            let joined = match self.requests.join_next().now_or_never() {
                Some(Some(joined)) => joined,
                _ => break,
            };
            if let Some(outcome) = self.absorb(joined) {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Applies outcomes until nothing is pending.
    pub async fn settle(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next_outcome().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    fn dispatch(&mut self, task_id: TaskId, description: String) -> RequestToken {
        self.issued += 1;
        let token = RequestToken(self.issued);
        let client = Arc::clone(&self.client);
        let request_task_id = task_id.clone();

        let abort = self.requests.spawn(async move {
            let result = AssertUnwindSafe(client.suggest(&description))
                .catch_unwind()
                .await
                .unwrap_or(Err(SuggestionError::Panicked));
            Completed {
                token,
                task_id: request_task_id,
                result,
            }
        });

        self.in_flight.insert(token, InFlight { task_id, abort });
        token
    }

    fn absorb(&mut self, joined: Result<Completed, JoinError>) -> Option<Outcome> {
        match joined {
            Ok(completed) => self.apply(completed),
            Err(err) => {
                debug!(error = %err, "absorb: request task ended without a result");
                None
            }
        }
    }

    fn apply(&mut self, completed: Completed) -> Option<Outcome> {
        let Completed {
            token,
            task_id,
            result,
        } = completed;

        if self.in_flight.remove(&token).is_none() {
            debug!(%token, "apply: cancelled request ignored");
            return None;
        }

        let resolution = match result {
            Ok(suggestion) => self.accept(token, &task_id, suggestion),
            Err(err) => {
                warn!(%token, %task_id, error = %err, "suggestion request failed");
                if let Err(err) = self.notifier.notify(&Notice::suggestion_failed()) {
                    warn!(error = %err, "failed to deliver notice");
                }
                Resolution::Failed
            }
        };

        Some(Outcome {
            token,
            task_id,
            resolution,
        })
    }

    fn accept(&mut self, token: RequestToken, task_id: &TaskId, suggestion: Suggestion) -> Resolution {
        if self.store.get(task_id).is_some() {
            self.per_task.insert(task_id.clone(), suggestion.clone());
        }

        let owns_slot = match self.policy {
            SuggestionPolicy::LastResolved => true,
            SuggestionPolicy::Latest => token.0 == self.issued,
        };

        if owns_slot {
            debug!(%token, %task_id, "accept: suggestion applied");
            self.draft.set_last_suggestion(suggestion.clone());
            Resolution::Applied(suggestion)
        } else {
            debug!(%token, %task_id, latest = self.issued, "accept: stale suggestion kept off the shared slot");
            Resolution::Superseded(suggestion)
        }
    }
}

impl fmt::Debug for ViewController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewController")
            .field("store", &self.store)
            .field("draft", &self.draft)
            .field("policy", &self.policy)
            .field("pending", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
