//! Async driver around the [`Store`].
//!
//! The board performs the effects a reduction asks for: it calls the
//! [`TaskApi`], asks the [`Surface`] for confirmation, and keeps at most one
//! notification timer alive on the current tokio runtime. Request outcomes
//! are fed back into the store as `Result` values.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use taskdeck_shared::TaskId;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, TaskApi};
use crate::form::{DraftField, FormMode, ValidationError};
use crate::store::{Action, AppState, Effect, Store, SubmitRejection};
use crate::task::Task;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// UI collaborators the state machine needs but does not own.
pub trait Surface {
    /// Blocking yes/no question.
    fn confirm(&self, prompt: &str) -> bool;

    fn scroll_to_top(&self) {}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("a save is already in progress")]
    InFlight,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<SubmitRejection> for SubmitError {
    fn from(rejection: SubmitRejection) -> Self {
        match rejection {
            SubmitRejection::Invalid(err) => SubmitError::Invalid(err),
            SubmitRejection::InFlight => SubmitError::InFlight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    Declined,
}

pub struct TaskBoard<A, S> {
    store: Arc<Mutex<Store>>,
    api: A,
    surface: S,
    dismiss_timer: Mutex<Option<JoinHandle<()>>>,
}

impl<A: TaskApi, S: Surface> TaskBoard<A, S> {
    pub fn new(api: A, surface: S, notification_ttl: Duration) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::new(notification_ttl))),
            api,
            surface,
            dismiss_timer: Mutex::new(None),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.store.lock().state().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(self.store.lock().state())
    }

    pub fn edit_draft(&self, field: DraftField) {
        self.dispatch(Action::DraftEdited(field));
    }

    pub fn start_edit(&self, task: Task) {
        self.dispatch(Action::EditStarted(task));
    }

    /// Enters edit mode for a task from the current snapshot.
    pub fn start_edit_by_id(&self, id: TaskId) -> Option<TaskId> {
        let task = self.with_state(|state| state.tasks.find(id).cloned())?;
        self.start_edit(task);
        Some(id)
    }

    pub fn cancel(&self) {
        self.dispatch(Action::EditCancelled);
    }

    pub fn clear_form(&self) {
        self.dispatch(Action::FormCleared);
    }

    pub fn dismiss(&self) {
        self.dispatch(Action::NotificationDismissed);
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let generation = self
            .dispatch(Action::RefreshRequested)
            .into_iter()
            .find_map(|effect| match effect {
                Effect::Fetch { generation } => Some(generation),
                _ => None,
            });
        let Some(generation) = generation else {
            return Ok(());
        };

        let result = self.api.list().await;
        let outcome = result.as_ref().map(|_| ()).map_err(ApiError::clone);
        self.dispatch(Action::RefreshSettled { generation, result });
        outcome
    }

    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<Task, SubmitError> {
        let mut request = None;
        for effect in self.dispatch(Action::SubmitRequested) {
            match effect {
                Effect::Save { mode, payload } => request = Some((mode, payload)),
                Effect::SubmitRejected(rejection) => return Err(rejection.into()),
                _ => {}
            }
        }
        let Some((mode, payload)) = request else {
            return Err(SubmitError::InFlight);
        };

        let result = match mode {
            FormMode::Create => self.api.create(payload).await,
            FormMode::Edit(id) => self.api.update(id, payload).await,
        };
        let outcome = result.clone();

        let effects = self.dispatch(Action::SubmitSettled { mode, result });
        if needs_refresh(&effects) {
            self.refresh_after_mutation().await;
        }

        outcome.map_err(SubmitError::Api)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: TaskId) -> Result<RemoveOutcome, ApiError> {
        if !self.surface.confirm(DELETE_PROMPT) {
            debug!(%id, "delete declined");
            return Ok(RemoveOutcome::Declined);
        }

        self.dispatch(Action::DeleteConfirmed(id));
        let result = self.api.delete(id).await;
        let outcome = result.clone();

        let effects = self.dispatch(Action::DeleteSettled { id, result });
        if needs_refresh(&effects) {
            self.refresh_after_mutation().await;
        }

        outcome.map(|()| RemoveOutcome::Deleted)
    }

    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.refresh().await {
            info!(error = %err, "refresh after mutation failed");
        }
    }

    /// Reduces `action`, runs the UI-side effects and hands back the rest.
    fn dispatch(&self, action: Action) -> Vec<Effect> {
        let effects = self.store.lock().dispatch(action);

        let mut pending = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::ScrollToTop => self.surface.scroll_to_top(),
                Effect::ScheduleDismiss { generation, after } => self.schedule_dismiss(generation, after),
                Effect::CancelDismiss => self.cancel_dismiss(),
                other => pending.push(other),
            }
        }
        pending
    }

    fn schedule_dismiss(&self, generation: u64, after: Duration) {
        let mut slot = self.dismiss_timer.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(generation, "no async runtime; notification will not auto-dismiss");
            return;
        };

        let store = Arc::clone(&self.store);
        *slot = Some(runtime.spawn(async move {
            tokio::time::sleep(after).await;
            store.lock().dispatch(Action::NotificationExpired { generation });
        }));
    }

    fn cancel_dismiss(&self) {
        if let Some(timer) = self.dismiss_timer.lock().take() {
            timer.abort();
        }
    }
}

impl<A, S> Drop for TaskBoard<A, S> {
    fn drop(&mut self) {
        if let Some(timer) = self.dismiss_timer.get_mut().take() {
            timer.abort();
        }
    }
}

fn needs_refresh(effects: &[Effect]) -> bool {
    effects.iter().any(|effect| matches!(effect, Effect::Refresh))
}
