use chrono::NaiveDateTime;
use taskdeck_shared::{TaskDto, TaskId};

use crate::datetime::{local_now, parse_deadline};
use crate::status::{StatusLabel, TaskStatus, status_label};

/// Client-side copy of a task from the last fetched snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub deadline: Option<String>,
    pub created_at: Option<String>,
    pub status: String,
}

impl Task {
    /// Builds the client copy, deriving the status locally when the server
    /// did not send one.
    pub fn from_dto(dto: TaskDto, now: NaiveDateTime) -> Self {
        let deadline = dto.deadline.filter(|raw| !raw.trim().is_empty());
        let status = match dto.status.filter(|raw| !raw.trim().is_empty()) {
            Some(status) => status,
            None => {
                let derived = TaskStatus::derive(
                    dto.completed,
                    deadline.as_deref().and_then(parse_deadline),
                    now,
                );
                tracing::trace!(id = %dto.id, status = derived.as_str(), "derived missing status");
                derived.as_str().to_string()
            }
        };

        Self {
            id: dto.id,
            title: dto.title,
            description: dto.description.unwrap_or_default(),
            completed: dto.completed,
            deadline,
            created_at: dto.created_at,
            status,
        }
    }

    pub fn deadline_at(&self) -> Option<NaiveDateTime> {
        self.deadline.as_deref().and_then(parse_deadline)
    }

    pub fn status_label(&self) -> StatusLabel {
        status_label(&self.status)
    }
}

impl From<TaskDto> for Task {
    fn from(dto: TaskDto) -> Self {
        Task::from_dto(dto, local_now())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn dto(status: Option<&str>, completed: bool, deadline: Option<&str>) -> TaskDto {
        TaskDto {
            id: TaskId(3),
            title: "Write report".to_string(),
            description: None,
            completed,
            deadline: deadline.map(str::to_string),
            created_at: None,
            status: status.map(str::to_string),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn keeps_server_status() {
        let task = Task::from_dto(dto(Some("late"), false, None), now());
        assert_eq!(task.status, "late");
        assert_eq!(task.description, "");
    }

    #[test]
    fn derives_status_when_server_omits_it() {
        let task = Task::from_dto(dto(None, false, Some("2026-04-30T09:00:00")), now());
        assert_eq!(task.status, "late");

        let task = Task::from_dto(dto(Some(""), true, None), now());
        assert_eq!(task.status, "completed");
    }

    #[test]
    fn blank_deadline_is_treated_as_absent() {
        let task = Task::from_dto(dto(None, false, Some("  ")), now());
        assert_eq!(task.deadline, None);
        assert_eq!(task.status, "pending");
    }
}
