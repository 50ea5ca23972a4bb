pub mod api;
pub mod board;
pub mod cli;
pub mod collection;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod form;
pub mod http;
pub mod notify;
pub mod render;
pub mod shell;
pub mod status;
pub mod store;
pub mod task;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting deck"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.deckrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );
  if let Some(url) = cli.api_url {
    cfg.set("api.url", url);
  }

  let settings = cfg
    .settings()
    .context("invalid configuration")?;

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async \
         runtime"
      )?;

  let command = cli
    .command
    .unwrap_or(cli::Command::List);
  runtime.block_on(
    commands::dispatch(
      &settings, command
    )
  )?;

  info!("done");
  Ok(())
}
