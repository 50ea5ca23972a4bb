use std::io::{self, Write};

use anyhow::{Context, anyhow, bail};
use taskdeck_shared::TaskId;
use tracing::{debug, info, instrument};

use crate::api::TaskApi;
use crate::board::{RemoveOutcome, Surface, TaskBoard};
use crate::cli::{AddArgs, Command, EditArgs};
use crate::config::ClientSettings;
use crate::form::DraftField;
use crate::http::HttpTaskApi;
use crate::notify::NotificationKind;
use crate::render::Renderer;
use crate::shell;

/// Terminal stand-in for the browser's confirm dialog and scroll hook.
#[derive(Debug, Clone, Default)]
pub struct TerminalSurface {
    assume_yes: bool,
}

impl TerminalSurface {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Surface for TerminalSurface {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            debug!(prompt, "confirmation assumed");
            return true;
        }

        let mut err = io::stderr().lock();
        if write!(err, "{prompt} [y/N] ").and_then(|()| err.flush()).is_err() {
            return false;
        }
        drop(err);

        let mut answer = String::new();
        match io::stdin().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(err) => {
                debug!(error = %err, "failed to read confirmation");
                false
            }
        }
    }

    fn scroll_to_top(&self) {
        debug!("form focus requested");
    }
}

#[instrument(skip(settings), fields(api = %settings.api_url))]
pub async fn dispatch(settings: &ClientSettings, command: Command) -> anyhow::Result<()> {
    let api = HttpTaskApi::new(&settings.api_url, settings.timeout)
        .context("failed to set up http client")?;
    let renderer = Renderer::new(settings.color);
    let assume_yes = matches!(command, Command::Delete { yes: true, .. });
    let board = TaskBoard::new(api, TerminalSurface::new(assume_yes), settings.notification_ttl);

    info!(?command, "dispatching command");
    match command {
        Command::List => {
            refresh(&board).await;
            report(&board, &renderer)?;
            board.with_state(|state| renderer.print_task_table(state.tasks.tasks()))
        }
        Command::Show { id } => {
            let task = board
                .api()
                .get(id)
                .await
                .map_err(|err| anyhow!("{}", err.user_message_or("Failed to fetch task")))?;
            renderer.print_task_info(&task)
        }
        Command::Add(args) => add(&board, &renderer, args).await,
        Command::Edit(args) => edit(&board, &renderer, args).await,
        Command::Delete { id, .. } => delete(&board, &renderer, id).await,
        Command::Ping => {
            let reply = board
                .api()
                .ping()
                .await
                .with_context(|| format!("backend at {} did not answer", settings.api_url))?;
            println!("{reply}");
            Ok(())
        }
        Command::Shell => shell::run(&board, &renderer).await,
    }
}

async fn add<A: TaskApi, S: Surface>(
    board: &TaskBoard<A, S>,
    renderer: &Renderer,
    args: AddArgs,
) -> anyhow::Result<()> {
    board.edit_draft(DraftField::Title(args.title));
    if let Some(description) = args.description {
        board.edit_draft(DraftField::Description(description));
    }
    if let Some(deadline) = args.deadline {
        board.edit_draft(DraftField::Deadline(deadline));
    }
    board.edit_draft(DraftField::Completed(args.completed));

    let created = board.submit().await;
    report(board, renderer)?;
    if let Ok(task) = created {
        renderer.print_task_info(&task)?;
    }
    Ok(())
}

async fn edit<A: TaskApi, S: Surface>(
    board: &TaskBoard<A, S>,
    renderer: &Renderer,
    args: EditArgs,
) -> anyhow::Result<()> {
    refresh(board).await;
    report(board, renderer)?;

    if board.start_edit_by_id(args.id).is_none() {
        bail!("task {} not found", args.id);
    }

    if let Some(title) = args.title {
        board.edit_draft(DraftField::Title(title));
    }
    if let Some(description) = args.description {
        board.edit_draft(DraftField::Description(description));
    }
    if args.clear_deadline {
        board.edit_draft(DraftField::Deadline(String::new()));
    } else if let Some(deadline) = args.deadline {
        board.edit_draft(DraftField::Deadline(deadline));
    }
    if let Some(completed) = args.completed {
        board.edit_draft(DraftField::Completed(completed));
    }

    let updated = board.submit().await;
    report(board, renderer)?;
    if let Ok(task) = updated {
        renderer.print_task_info(&task)?;
    }
    Ok(())
}

async fn delete<A: TaskApi, S: Surface>(
    board: &TaskBoard<A, S>,
    renderer: &Renderer,
    id: TaskId,
) -> anyhow::Result<()> {
    match board.remove(id).await {
        Ok(RemoveOutcome::Declined) => {
            eprintln!("delete cancelled");
            Ok(())
        }
        _ => {
            report(board, renderer)?;
            board.with_state(|state| renderer.print_task_table(state.tasks.tasks()))
        }
    }
}

/// Refetches the list; a failure is left on the board as a notification
/// for [`report`] to turn into the command's error.
async fn refresh<A: TaskApi, S: Surface>(board: &TaskBoard<A, S>) {
    if let Err(err) = board.refresh().await {
        debug!(error = %err, "refresh failed");
    }
}

/// Prints the current notification; an error notification becomes the
/// command's error.
fn report<A: TaskApi, S: Surface>(board: &TaskBoard<A, S>, renderer: &Renderer) -> anyhow::Result<()> {
    let Some(notification) = board.with_state(|state| state.notification().cloned()) else {
        return Ok(());
    };

    if notification.kind == NotificationKind::Error {
        bail!("{}", notification.message);
    }
    renderer.print_notification(&notification)
}
