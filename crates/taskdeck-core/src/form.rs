use taskdeck_shared::{TaskId, TaskPayload};

use crate::datetime::{parse_deadline, to_input_format, to_input_value};
use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Task title is required")]
    BlankTitle,
    #[error("Deadline must be formatted as YYYY-MM-DDTHH:MM")]
    InvalidDeadline(String),
}

/// Unsaved form contents. `deadline` holds the raw form-field text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub deadline: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit(TaskId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftField {
    Title(String),
    Description(String),
    Completed(bool),
    Deadline(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskForm {
    draft: Draft,
    mode: FormMode,
}

impl TaskForm {
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn editing(&self) -> Option<TaskId> {
        match self.mode {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(id),
        }
    }

    pub fn start_edit(&mut self, task: &Task) {
        self.draft = Draft {
            title: task.title.clone(),
            description: task.description.clone(),
            completed: task.completed,
            deadline: task.deadline.as_deref().map(to_input_value).unwrap_or_default(),
        };
        self.mode = FormMode::Edit(task.id);
    }

    pub fn reset(&mut self) {
        self.draft = Draft::default();
        self.mode = FormMode::Create;
    }

    pub fn apply(&mut self, field: DraftField) {
        match field {
            DraftField::Title(title) => self.draft.title = title,
            DraftField::Description(description) => self.draft.description = description,
            DraftField::Completed(completed) => self.draft.completed = completed,
            DraftField::Deadline(deadline) => self.draft.deadline = deadline,
        }
    }

    /// Builds the request body for the current draft.
    pub fn payload(&self) -> Result<TaskPayload, ValidationError> {
        let title = self.draft.title.trim();
        if title.is_empty() {
            return Err(ValidationError::BlankTitle);
        }

        let raw_deadline = self.draft.deadline.trim();
        let deadline = if raw_deadline.is_empty() {
            None
        } else {
            let parsed = parse_deadline(raw_deadline)
                .ok_or_else(|| ValidationError::InvalidDeadline(raw_deadline.to_string()))?;
            Some(to_input_format(parsed))
        };

        Ok(TaskPayload {
            title: title.to_string(),
            description: self.draft.description.trim().to_string(),
            completed: self.draft.completed,
            deadline,
        })
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "➕ Add New Task",
            FormMode::Edit(_) => "✏️ Edit Task",
        }
    }

    pub fn submit_label(&self, busy: bool) -> &'static str {
        match (busy, self.mode) {
            (true, _) => "Saving...",
            (false, FormMode::Create) => "Add Task",
            (false, FormMode::Edit(_)) => "Update Task",
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn task() -> Task {
        Task {
            id: TaskId(9),
            title: "Plan sprint".to_string(),
            description: "next week".to_string(),
            completed: true,
            deadline: Some("2026-06-01T17:45:30.5".to_string()),
            created_at: None,
            status: "completed-on-time".to_string(),
        }
    }

    #[test]
    fn start_edit_copies_editable_fields() {
        let mut form = TaskForm::default();
        form.start_edit(&task());
        assert_eq!(
            form.draft(),
            &Draft {
                title: "Plan sprint".to_string(),
                description: "next week".to_string(),
                completed: true,
                deadline: "2026-06-01T17:45".to_string(),
            }
        );
        assert_eq!(form.mode(), FormMode::Edit(TaskId(9)));
        assert_eq!(form.heading(), "✏️ Edit Task");
    }

    #[test]
    fn reset_after_edit_matches_fresh_form() {
        let mut form = TaskForm::default();
        form.start_edit(&task());
        form.reset();
        assert_eq!(form, TaskForm::default());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut form = TaskForm::default();
        form.apply(DraftField::Title(" \t\n".to_string()));
        assert_eq!(form.payload(), Err(ValidationError::BlankTitle));
    }

    #[test]
    fn payload_trims_and_normalizes_deadline() {
        let mut form = TaskForm::default();
        form.apply(DraftField::Title("  Ship  ".to_string()));
        form.apply(DraftField::Description(" notes ".to_string()));
        form.apply(DraftField::Deadline("2026-07-04 08:05".to_string()));
        form.apply(DraftField::Completed(true));

        assert_eq!(
            form.payload(),
            Ok(TaskPayload {
                title: "Ship".to_string(),
                description: "notes".to_string(),
                completed: true,
                deadline: Some("2026-07-04T08:05".to_string()),
            })
        );
    }

    #[test]
    fn malformed_deadline_is_rejected() {
        let mut form = TaskForm::default();
        form.apply(DraftField::Title("Ship".to_string()));
        form.apply(DraftField::Deadline("tomorrow".to_string()));
        assert_eq!(
            form.payload(),
            Err(ValidationError::InvalidDeadline("tomorrow".to_string()))
        );
    }

    #[test]
    fn submit_label_tracks_mode_and_busy() {
        let mut form = TaskForm::default();
        assert_eq!(form.submit_label(false), "Add Task");
        form.start_edit(&task());
        assert_eq!(form.submit_label(false), "Update Task");
        assert_eq!(form.submit_label(true), "Saving...");
    }
}
