use std::io::{self, BufRead, Write};

use taskdeck_shared::TaskId;
use tracing::{debug, instrument};

use crate::api::TaskApi;
use crate::board::{Surface, TaskBoard};
use crate::form::DraftField;
use crate::render::Renderer;

const HELP: &str = "\
commands:
  list                 refetch and show tasks
  new                  clear the form (leaves edit mode)
  edit <id>            load a task into the form
  title <text>         set the draft title
  desc <text>          set the draft description
  deadline [value]     set or clear the draft deadline (YYYY-MM-DDTHH:MM)
  done | undone        toggle the draft's completed flag
  submit               create or update from the form
  cancel               leave edit mode and clear the form
  delete <id>          delete a task (asks first)
  dismiss              hide the current notification
  form                 show the form
  help                 this text
  quit                 leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    New,
    Edit(TaskId),
    Field(DraftField),
    Submit,
    Cancel,
    Delete(TaskId),
    Dismiss,
    Form,
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => ShellCommand::List,
            "new" => ShellCommand::New,
            "edit" => ShellCommand::Edit(parse_id(rest)?),
            "title" => ShellCommand::Field(DraftField::Title(rest.to_string())),
            "desc" | "description" => ShellCommand::Field(DraftField::Description(rest.to_string())),
            "deadline" => ShellCommand::Field(DraftField::Deadline(rest.to_string())),
            "done" => ShellCommand::Field(DraftField::Completed(true)),
            "undone" => ShellCommand::Field(DraftField::Completed(false)),
            "submit" | "save" => ShellCommand::Submit,
            "cancel" => ShellCommand::Cancel,
            "delete" | "rm" => ShellCommand::Delete(parse_id(rest)?),
            "dismiss" => ShellCommand::Dismiss,
            "form" => ShellCommand::Form,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(format!("unknown command: {other} (try `help`)")),
        };
        Ok(Some(command))
    }
}

fn parse_id(raw: &str) -> Result<TaskId, String> {
    raw.parse::<TaskId>()
        .map_err(|_| format!("expected a task id, got `{raw}`"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented session over one board.
///
/// Reads stdin synchronously on the runtime thread; pending notification
/// timers get their turn at the yield before each prompt.
#[instrument(skip_all)]
pub async fn run<A: TaskApi, S: Surface>(board: &TaskBoard<A, S>, renderer: &Renderer) -> anyhow::Result<()> {
    execute(board, renderer, ShellCommand::List).await?;

    let stdin = io::stdin();
    let mut shown_generation = 0;
    let mut line = String::new();

    loop {
        tokio::task::yield_now().await;

        let (generation, notification, editing) = board.with_state(|state| {
            (
                state.notifications.generation(),
                state.notification().cloned(),
                state.form.editing(),
            )
        });
        if generation != shown_generation {
            shown_generation = generation;
            if let Some(notification) = notification {
                renderer.print_notification(&notification)?;
            }
        }

        {
            let mut out = io::stdout().lock();
            match editing {
                Some(id) => write!(out, "deck[edit #{id}]> ")?,
                None => write!(out, "deck> ")?,
            }
            out.flush()?;
        }

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            debug!("stdin closed");
            break;
        }

        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        if execute(board, renderer, command).await? == Flow::Quit {
            break;
        }
    }

    Ok(())
}

/// Runs one shell command against the board. Request failures are already
/// on the board as notifications, so only output errors end the session.
pub async fn execute<A: TaskApi, S: Surface>(
    board: &TaskBoard<A, S>,
    renderer: &Renderer,
    command: ShellCommand,
) -> anyhow::Result<Flow> {
    match command {
        ShellCommand::List => {
            if let Err(err) = board.refresh().await {
                debug!(error = %err, "refresh failed");
            }
            print_tasks(board, renderer)?;
        }
        ShellCommand::New => {
            board.clear_form();
            print_form(board, renderer)?;
        }
        ShellCommand::Edit(id) => {
            if board.start_edit_by_id(id).is_none() {
                eprintln!("task {id} is not in the current list");
            } else {
                print_form(board, renderer)?;
            }
        }
        ShellCommand::Field(field) => board.edit_draft(field),
        ShellCommand::Submit => match board.submit().await {
            Ok(_) => print_tasks(board, renderer)?,
            Err(err) => debug!(error = %err, "submit did not go through"),
        },
        ShellCommand::Cancel => board.cancel(),
        ShellCommand::Delete(id) => {
            if let Err(err) = board.remove(id).await {
                debug!(%id, error = %err, "delete failed");
            }
            print_tasks(board, renderer)?;
        }
        ShellCommand::Dismiss => board.dismiss(),
        ShellCommand::Form => print_form(board, renderer)?,
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn print_tasks<A: TaskApi, S: Surface>(board: &TaskBoard<A, S>, renderer: &Renderer) -> anyhow::Result<()> {
    board.with_state(|state| renderer.print_task_table(state.tasks.tasks()))
}

fn print_form<A: TaskApi, S: Surface>(board: &TaskBoard<A, S>, renderer: &Renderer) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    board.with_state(|state| renderer.write_form(&mut out, &state.form, state.is_busy()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use taskdeck_shared::TaskPayload;

    use super::*;
    use crate::api::ApiError;
    use crate::form::Draft;
    use crate::task::Task;

    struct Offline;

    impl TaskApi for Offline {
        async fn list(&self) -> Result<Vec<Task>, ApiError> {
            Err(ApiError::Transport("offline".to_string()))
        }

        async fn create(&self, _payload: TaskPayload) -> Result<Task, ApiError> {
            Err(ApiError::Transport("offline".to_string()))
        }

        async fn update(&self, _id: TaskId, _payload: TaskPayload) -> Result<Task, ApiError> {
            Err(ApiError::Transport("offline".to_string()))
        }

        async fn delete(&self, _id: TaskId) -> Result<(), ApiError> {
            Err(ApiError::Transport("offline".to_string()))
        }
    }

    struct Decline;

    impl Surface for Decline {
        fn confirm(&self, _prompt: &str) -> bool {
            false
        }
    }

    fn board() -> TaskBoard<Offline, Decline> {
        TaskBoard::new(Offline, Decline, Duration::from_secs(3))
    }

    #[tokio::test]
    async fn new_clears_a_half_typed_draft() {
        let board = board();
        let renderer = Renderer::plain();
        for line in ["title Buy milk", "desc two litres", "done"] {
            let command = ShellCommand::parse(line).expect("parse").expect("command");
            execute(&board, &renderer, command).await.expect("execute");
        }
        assert_eq!(board.with_state(|state| state.form.draft().title.clone()), "Buy milk");

        let flow = execute(&board, &renderer, ShellCommand::New).await.expect("execute");

        assert_eq!(flow, Flow::Continue);
        assert_eq!(board.with_state(|state| state.form.draft().clone()), Draft::default());
        assert_eq!(board.with_state(|state| state.notification().cloned()), None);
    }

    #[tokio::test]
    async fn failed_list_stays_in_the_session() {
        let board = board();
        let flow = execute(&board, &Renderer::plain(), ShellCommand::List)
            .await
            .expect("execute");

        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            board.with_state(|state| state.notification().map(|n| n.message.clone())),
            Some("Failed to fetch tasks".to_string())
        );
        assert_eq!(
            execute(&board, &Renderer::plain(), ShellCommand::Quit).await.expect("execute"),
            Flow::Quit
        );
    }

    #[test]
    fn parses_field_commands_with_free_text() {
        assert_eq!(
            ShellCommand::parse("title   Buy milk and eggs "),
            Ok(Some(ShellCommand::Field(DraftField::Title("Buy milk and eggs".to_string()))))
        );
        assert_eq!(
            ShellCommand::parse("deadline"),
            Ok(Some(ShellCommand::Field(DraftField::Deadline(String::new()))))
        );
        assert_eq!(
            ShellCommand::parse("DONE"),
            Ok(Some(ShellCommand::Field(DraftField::Completed(true))))
        );
    }

    #[test]
    fn parses_id_commands() {
        assert_eq!(ShellCommand::parse("edit 4"), Ok(Some(ShellCommand::Edit(TaskId(4)))));
        assert_eq!(ShellCommand::parse("rm 10"), Ok(Some(ShellCommand::Delete(TaskId(10)))));
        assert!(ShellCommand::parse("delete").is_err());
        assert!(ShellCommand::parse("edit four").is_err());
    }

    #[test]
    fn blank_lines_and_unknown_words() {
        assert_eq!(ShellCommand::parse("   "), Ok(None));
        assert!(ShellCommand::parse("frobnicate").is_err());
    }
}
