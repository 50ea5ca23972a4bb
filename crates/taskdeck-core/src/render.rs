use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::datetime::format_deadline;
use crate::form::TaskForm;
use crate::notify::{Notification, NotificationKind};
use crate::status::{TaskStatus, status_label};
use crate::task::Task;

pub const EMPTY_STATE: &str = "📝 No tasks yet. Create your first task above!";
const NO_DESCRIPTION: &str = "No description";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self {
            color: color && io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn print_task_table(&self, tasks: &[Task]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_task_table(&mut out, tasks)
    }

    pub fn write_task_table<W: Write>(&self, mut out: W, tasks: &[Task]) -> anyhow::Result<()> {
        if tasks.is_empty() {
            writeln!(out, "{EMPTY_STATE}")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Status".to_string(),
            "Deadline".to_string(),
            "Title".to_string(),
            "Description".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());
        for task in tasks {
            let id = self.paint(&task.id.to_string(), "33");
            let status = self.paint(task.status_label().text, status_color(&task.status));
            let deadline = task
                .deadline
                .as_deref()
                .map(|raw| format_deadline(raw).unwrap_or_else(|| raw.to_string()))
                .unwrap_or_default();
            rows.push(vec![
                id,
                status,
                deadline,
                task.title.clone(),
                description_or_placeholder(&task.description).to_string(),
            ]);
        }

        write_table(&mut out, headers, rows)
    }

    #[tracing::instrument(skip(self, task))]
    pub fn print_task_info(&self, task: &Task) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_task_info(&mut out, task)
    }

    pub fn write_task_info<W: Write>(&self, mut out: W, task: &Task) -> anyhow::Result<()> {
        writeln!(out, "id          {}", task.id)?;
        writeln!(out, "title       {}", task.title)?;
        writeln!(out, "description {}", description_or_placeholder(&task.description))?;
        writeln!(out, "completed   {}", if task.completed { "yes" } else { "no" })?;
        writeln!(
            out,
            "status      {}",
            self.paint(status_label(&task.status).text, status_color(&task.status))
        )?;
        if let Some(deadline) = task.deadline.as_deref() {
            let shown = format_deadline(deadline).unwrap_or_else(|| deadline.to_string());
            writeln!(out, "deadline    📅 {shown}")?;
        }
        if let Some(created) = task.created_at.as_deref() {
            let shown = format_deadline(created).unwrap_or_else(|| created.to_string());
            writeln!(out, "created     {shown}")?;
        }
        Ok(())
    }

    pub fn print_notification(&self, notification: &Notification) -> anyhow::Result<()> {
        let mut err = io::stderr().lock();
        self.write_notification(&mut err, notification)
    }

    pub fn write_notification<W: Write>(&self, mut out: W, notification: &Notification) -> anyhow::Result<()> {
        let code = match notification.kind {
            NotificationKind::Success => "32",
            NotificationKind::Error => "31",
            NotificationKind::Info => "36",
        };
        let line = format!("{} {}", notification.kind.icon(), notification.message);
        writeln!(out, "{}", self.paint(&line, code))?;
        Ok(())
    }

    pub fn write_form<W: Write>(&self, mut out: W, form: &TaskForm, busy: bool) -> anyhow::Result<()> {
        let draft = form.draft();
        writeln!(out, "{}", form.heading())?;
        writeln!(out, "  title       {}", draft.title)?;
        writeln!(out, "  description {}", draft.description)?;
        writeln!(
            out,
            "  deadline    {}",
            if draft.deadline.is_empty() { "-" } else { draft.deadline.as_str() }
        )?;
        writeln!(out, "  completed   [{}]", if draft.completed { "x" } else { " " })?;
        writeln!(out, "  ({})", form.submit_label(busy))?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn description_or_placeholder(description: &str) -> &str {
    if description.trim().is_empty() {
        NO_DESCRIPTION
    } else {
        description
    }
}

fn status_color(raw: &str) -> &'static str {
    match TaskStatus::parse(raw).unwrap_or(TaskStatus::Pending) {
        TaskStatus::Late => "31",
        TaskStatus::OnTime => "33",
        TaskStatus::CompletedLate => "35",
        TaskStatus::Completed | TaskStatus::CompletedOnTime => "32",
        TaskStatus::Pending => "36",
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
