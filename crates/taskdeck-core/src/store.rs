//! State container for the task board.
//!
//! Every change to form, list or notification state goes through
//! [`Store::dispatch`] as a typed [`Action`]. Reductions never perform I/O;
//! they return [`Effect`]s for the driver to carry out.

use std::time::Duration;

use taskdeck_shared::{TaskId, TaskPayload};
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::collection::TaskCollection;
use crate::form::{DraftField, FormMode, TaskForm, ValidationError};
use crate::notify::{DEFAULT_NOTIFICATION_TTL, Notification, NotificationQueue};
use crate::task::Task;

pub const FETCH_FAILED: &str = "Failed to fetch tasks";
pub const SAVE_FAILED: &str = "Failed to save task";
pub const DELETE_FAILED: &str = "Failed to delete task";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    DraftEdited(DraftField),
    EditStarted(Task),
    EditCancelled,
    /// Empties the form; leaves edit mode if it was on.
    FormCleared,
    SubmitRequested,
    SubmitSettled {
        mode: FormMode,
        result: Result<Task, ApiError>,
    },
    RefreshRequested,
    RefreshSettled {
        generation: u64,
        result: Result<Vec<Task>, ApiError>,
    },
    DeleteConfirmed(TaskId),
    DeleteSettled {
        id: TaskId,
        result: Result<(), ApiError>,
    },
    Notify(Notification),
    NotificationDismissed,
    NotificationExpired {
        generation: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Save {
        mode: FormMode,
        payload: TaskPayload,
    },
    Fetch {
        generation: u64,
    },
    Delete {
        id: TaskId,
    },
    Refresh,
    ScrollToTop,
    ScheduleDismiss {
        generation: u64,
        after: Duration,
    },
    CancelDismiss,
    /// No request was issued for a submit; tells the driver why.
    SubmitRejected(SubmitRejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejection {
    Invalid(ValidationError),
    InFlight,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub form: TaskForm,
    pub tasks: TaskCollection,
    pub notifications: NotificationQueue,
    pub submitting: bool,
}

impl AppState {
    pub fn is_busy(&self) -> bool {
        self.tasks.is_busy()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    state: AppState,
    notification_ttl: Duration,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

impl Store {
    pub fn new(notification_ttl: Duration) -> Self {
        Self {
            state: AppState::default(),
            notification_ttl,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[tracing::instrument(level = "debug", skip_all, fields(action = action_name(&action)))]
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let mut effects = Vec::new();

        match action {
            Action::DraftEdited(field) => self.state.form.apply(field),
            Action::EditStarted(task) => {
                debug!(id = %task.id, "entering edit mode");
                self.state.form.start_edit(&task);
                self.notify(Notification::info("Edit mode activated"), &mut effects);
                effects.push(Effect::ScrollToTop);
            }
            Action::EditCancelled => {
                self.state.form.reset();
                self.notify(Notification::info("Edit cancelled"), &mut effects);
            }
            Action::FormCleared => {
                let was_editing = self.state.form.editing().is_some();
                self.state.form.reset();
                if was_editing {
                    self.notify(Notification::info("Edit cancelled"), &mut effects);
                }
            }
            Action::SubmitRequested => self.request_submit(&mut effects),
            Action::SubmitSettled { mode, result } => {
                self.state.tasks.settle();
                self.state.submitting = false;
                match result {
                    Ok(task) => {
                        let message = match mode {
                            FormMode::Create => "Task created successfully!",
                            FormMode::Edit(_) => "Task updated successfully!",
                        };
                        debug!(id = %task.id, ?mode, "task saved");
                        self.notify(Notification::success(message), &mut effects);
                        self.state.form.reset();
                        effects.push(Effect::Refresh);
                    }
                    Err(err) => {
                        warn!(error = %err, ?mode, "saving task failed");
                        let message = err.user_message_or(SAVE_FAILED).to_string();
                        self.notify(Notification::error(message), &mut effects);
                    }
                }
            }
            Action::RefreshRequested => {
                let generation = self.state.tasks.begin_refresh();
                effects.push(Effect::Fetch { generation });
            }
            Action::RefreshSettled { generation, result } => {
                self.state.tasks.settle();
                if !self.state.tasks.is_current(generation) {
                    debug!(generation, "discarding stale refresh response");
                } else {
                    match result {
                        Ok(tasks) => {
                            debug!(count = tasks.len(), "task snapshot replaced");
                            self.state.tasks.replace(tasks);
                        }
                        Err(err) => {
                            warn!(error = %err, "fetching tasks failed");
                            let message = err.user_message_or(FETCH_FAILED).to_string();
                            self.notify(Notification::error(message), &mut effects);
                        }
                    }
                }
            }
            Action::DeleteConfirmed(id) => {
                self.state.tasks.begin();
                effects.push(Effect::Delete { id });
            }
            Action::DeleteSettled { id, result } => {
                self.state.tasks.settle();
                match result {
                    Ok(()) => {
                        debug!(%id, "task deleted");
                        self.notify(Notification::success("Task deleted successfully!"), &mut effects);
                        effects.push(Effect::Refresh);
                    }
                    Err(err) => {
                        warn!(%id, error = %err, "deleting task failed");
                        let message = err.user_message_or(DELETE_FAILED).to_string();
                        self.notify(Notification::error(message), &mut effects);
                    }
                }
            }
            Action::Notify(notification) => self.notify(notification, &mut effects),
            Action::NotificationDismissed => {
                self.state.notifications.dismiss();
                effects.push(Effect::CancelDismiss);
            }
            Action::NotificationExpired { generation } => {
                self.state.notifications.expire(generation);
            }
        }

        effects
    }

    fn request_submit(&mut self, effects: &mut Vec<Effect>) {
        if self.state.submitting {
            debug!("ignored duplicate submit while busy");
            effects.push(Effect::SubmitRejected(SubmitRejection::InFlight));
            return;
        }

        match self.state.form.payload() {
            Ok(payload) => {
                self.state.submitting = true;
                self.state.tasks.begin();
                effects.push(Effect::Save {
                    mode: self.state.form.mode(),
                    payload,
                });
            }
            Err(err) => {
                debug!(error = %err, "draft failed validation");
                self.notify(Notification::error(err.to_string()), effects);
                effects.push(Effect::SubmitRejected(SubmitRejection::Invalid(err)));
            }
        }
    }

    fn notify(&mut self, notification: Notification, effects: &mut Vec<Effect>) {
        let generation = self.state.notifications.show(notification);
        effects.push(Effect::ScheduleDismiss {
            generation,
            after: self.notification_ttl,
        });
    }
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::DraftEdited(_) => "draft_edited",
        Action::EditStarted(_) => "edit_started",
        Action::EditCancelled => "edit_cancelled",
        Action::FormCleared => "form_cleared",
        Action::SubmitRequested => "submit_requested",
        Action::SubmitSettled { .. } => "submit_settled",
        Action::RefreshRequested => "refresh_requested",
        Action::RefreshSettled { .. } => "refresh_settled",
        Action::DeleteConfirmed(_) => "delete_confirmed",
        Action::DeleteSettled { .. } => "delete_settled",
        Action::Notify(_) => "notify",
        Action::NotificationDismissed => "notification_dismissed",
        Action::NotificationExpired { .. } => "notification_expired",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::form::Draft;
    use crate::notify::NotificationKind;

    fn task(id: u64, title: &str) -> Task {
        Task {
            id: TaskId(id),
            title: title.to_string(),
            description: String::new(),
            completed: false,
            deadline: None,
            created_at: None,
            status: "pending".to_string(),
        }
    }

    fn save_effect(effects: &[Effect]) -> Option<(FormMode, TaskPayload)> {
        effects.iter().find_map(|effect| match effect {
            Effect::Save { mode, payload } => Some((*mode, payload.clone())),
            _ => None,
        })
    }

    #[test]
    fn blank_submit_reports_error_and_keeps_state() {
        let mut store = Store::default();
        store.dispatch(Action::DraftEdited(DraftField::Title("   ".to_string())));
        store.dispatch(Action::DraftEdited(DraftField::Description("kept".to_string())));
        let before = store.state().form.clone();

        let effects = store.dispatch(Action::SubmitRequested);

        assert_eq!(save_effect(&effects), None);
        assert!(effects.contains(&Effect::SubmitRejected(SubmitRejection::Invalid(
            ValidationError::BlankTitle
        ))));
        assert_eq!(store.state().form, before);
        assert!(!store.state().is_busy());
        assert_eq!(
            store.state().notification(),
            Some(&Notification::error("Task title is required"))
        );
    }

    #[test]
    fn submit_in_edit_mode_targets_the_task() {
        let mut store = Store::default();
        store.dispatch(Action::EditStarted(task(4, "Old")));
        store.dispatch(Action::DraftEdited(DraftField::Title("New".to_string())));

        let effects = store.dispatch(Action::SubmitRequested);
        let (mode, payload) = save_effect(&effects).expect("save requested");

        assert_eq!(mode, FormMode::Edit(TaskId(4)));
        assert_eq!(payload.title, "New");
        assert!(store.state().is_busy());
    }

    #[test]
    fn second_submit_while_saving_is_rejected() {
        let mut store = Store::default();
        store.dispatch(Action::DraftEdited(DraftField::Title("A".to_string())));
        store.dispatch(Action::SubmitRequested);

        let effects = store.dispatch(Action::SubmitRequested);
        assert_eq!(effects, vec![Effect::SubmitRejected(SubmitRejection::InFlight)]);
        assert_eq!(store.state().tasks.in_flight(), 1);
    }

    #[test]
    fn successful_save_resets_form_and_requests_refresh() {
        let mut store = Store::default();
        store.dispatch(Action::EditStarted(task(2, "B")));
        store.dispatch(Action::SubmitRequested);

        let effects = store.dispatch(Action::SubmitSettled {
            mode: FormMode::Edit(TaskId(2)),
            result: Ok(task(2, "B")),
        });

        assert!(effects.contains(&Effect::Refresh));
        assert_eq!(store.state().form.draft(), &Draft::default());
        assert_eq!(store.state().form.mode(), FormMode::Create);
        assert!(!store.state().is_busy());
        assert_eq!(
            store.state().notification(),
            Some(&Notification::success("Task updated successfully!"))
        );
    }

    #[test]
    fn failed_save_keeps_draft_and_uses_fallback_message() {
        let mut store = Store::default();
        store.dispatch(Action::DraftEdited(DraftField::Title("Keep me".to_string())));
        store.dispatch(Action::SubmitRequested);

        let effects = store.dispatch(Action::SubmitSettled {
            mode: FormMode::Create,
            result: Err(ApiError::server(500, None)),
        });

        assert!(!effects.contains(&Effect::Refresh));
        assert_eq!(store.state().form.draft().title, "Keep me");
        assert!(!store.state().submitting);
        assert_eq!(store.state().notification().map(|n| n.kind), Some(NotificationKind::Error));
        assert_eq!(store.state().notification().map(|n| n.message.as_str()), Some(SAVE_FAILED));
    }

    #[test]
    fn stale_refresh_is_discarded() {
        let mut store = Store::default();
        store.dispatch(Action::RefreshRequested);
        store.dispatch(Action::RefreshRequested);

        store.dispatch(Action::RefreshSettled {
            generation: 2,
            result: Ok(vec![task(1, "new")]),
        });
        store.dispatch(Action::RefreshSettled {
            generation: 1,
            result: Ok(vec![task(1, "old"), task(2, "gone")]),
        });

        assert_eq!(store.state().tasks.tasks(), &[task(1, "new")]);
        assert!(!store.state().is_busy());
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let mut store = Store::default();
        store.dispatch(Action::RefreshRequested);
        store.dispatch(Action::RefreshSettled {
            generation: 1,
            result: Ok(vec![task(1, "A")]),
        });

        store.dispatch(Action::RefreshRequested);
        store.dispatch(Action::RefreshSettled {
            generation: 2,
            result: Err(ApiError::Transport("refused".to_string())),
        });

        assert_eq!(store.state().tasks.tasks(), &[task(1, "A")]);
        assert_eq!(
            store.state().notification(),
            Some(&Notification::error(FETCH_FAILED))
        );
    }

    #[test]
    fn edit_then_cancel_matches_untouched_form() {
        let mut store = Store::default();
        let effects = store.dispatch(Action::EditStarted(task(8, "Draft")));
        assert!(effects.contains(&Effect::ScrollToTop));

        store.dispatch(Action::EditCancelled);
        assert_eq!(store.state().form, TaskForm::default());
        assert_eq!(
            store.state().notification(),
            Some(&Notification::info("Edit cancelled"))
        );
    }

    #[test]
    fn clearing_a_create_draft_is_silent() {
        let mut store = Store::default();
        store.dispatch(Action::DraftEdited(DraftField::Title("Buy milk".to_string())));
        store.dispatch(Action::DraftEdited(DraftField::Completed(true)));

        let effects = store.dispatch(Action::FormCleared);

        assert!(effects.is_empty());
        assert_eq!(store.state().form, TaskForm::default());
        assert_eq!(store.state().notification(), None);
    }

    #[test]
    fn clearing_while_editing_leaves_edit_mode() {
        let mut store = Store::default();
        store.dispatch(Action::EditStarted(task(5, "Old")));

        store.dispatch(Action::FormCleared);

        assert_eq!(store.state().form, TaskForm::default());
        assert_eq!(
            store.state().notification(),
            Some(&Notification::info("Edit cancelled"))
        );
    }

    #[test]
    fn every_notification_schedules_its_own_dismissal() {
        let mut store = Store::new(Duration::from_secs(5));
        let effects = store.dispatch(Action::Notify(Notification::info("hi")));
        assert_eq!(
            effects,
            vec![Effect::ScheduleDismiss {
                generation: 1,
                after: Duration::from_secs(5),
            }]
        );

        store.dispatch(Action::Notify(Notification::info("again")));
        store.dispatch(Action::NotificationExpired { generation: 1 });
        assert_eq!(store.state().notification(), Some(&Notification::info("again")));
    }

    #[test]
    fn failed_delete_does_not_refresh() {
        let mut store = Store::default();
        store.dispatch(Action::DeleteConfirmed(TaskId(3)));
        let effects = store.dispatch(Action::DeleteSettled {
            id: TaskId(3),
            result: Err(ApiError::server(404, None)),
        });
        assert!(!effects.contains(&Effect::Refresh));
        assert_eq!(
            store.state().notification(),
            Some(&Notification::error(DELETE_FAILED))
        );
        assert!(!store.state().is_busy());
    }
}
