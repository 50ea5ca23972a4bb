use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    OnTime,
    Late,
    Completed,
    CompletedOnTime,
    CompletedLate,
}

/// Badge presentation of a status: a style class and the text shown in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLabel {
    pub class_name: &'static str,
    pub text: &'static str,
}

impl TaskStatus {
    /// Status from the stored fields, using the same rules as the backend.
    pub fn derive(completed: bool, deadline: Option<NaiveDateTime>, now: NaiveDateTime) -> Self {
        let Some(deadline) = deadline else {
            return if completed {
                TaskStatus::Completed
            } else {
                TaskStatus::Pending
            };
        };

        if completed {
            if now < deadline {
                TaskStatus::CompletedOnTime
            } else {
                TaskStatus::CompletedLate
            }
        } else if now > deadline {
            TaskStatus::Late
        } else {
            TaskStatus::OnTime
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "pending" => Some(TaskStatus::Pending),
            "on-time" => Some(TaskStatus::OnTime),
            "late" => Some(TaskStatus::Late),
            "completed" => Some(TaskStatus::Completed),
            "completed-on-time" => Some(TaskStatus::CompletedOnTime),
            "completed-late" => Some(TaskStatus::CompletedLate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::OnTime => "on-time",
            TaskStatus::Late => "late",
            TaskStatus::Completed => "completed",
            TaskStatus::CompletedOnTime => "completed-on-time",
            TaskStatus::CompletedLate => "completed-late",
        }
    }

    pub fn is_completed(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::CompletedOnTime | TaskStatus::CompletedLate
        )
    }

    pub fn label(self) -> StatusLabel {
        let (class_name, text) = match self {
            TaskStatus::Pending => ("status-badge status-pending", "📝 Pending"),
            TaskStatus::OnTime => ("status-badge status-on-time", "⏳ On Time"),
            TaskStatus::Late => ("status-badge status-late", "⚠️ Late"),
            TaskStatus::Completed => ("status-badge status-completed", "✅ Completed"),
            TaskStatus::CompletedOnTime => (
                "status-badge status-completed-on-time",
                "✅ Completed On Time",
            ),
            TaskStatus::CompletedLate => {
                ("status-badge status-completed-late", "⏰ Completed Late")
            }
        };
        StatusLabel { class_name, text }
    }
}

/// Badge for a raw status string. Unknown values get the pending badge.
pub fn status_label(raw: &str) -> StatusLabel {
    TaskStatus::parse(raw).unwrap_or(TaskStatus::Pending).label()
}
