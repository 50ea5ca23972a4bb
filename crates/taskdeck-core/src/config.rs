use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::http::DEFAULT_API_URL;

const RC_ENV_VAR: &str = "DECKRC";
const RC_FILE_NAME: &str = ".deckrc";

#[derive(Debug, Clone)]
pub struct Config {
  map:              HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

/// Typed view of the keys the client
/// reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
  pub api_url:          String,
  pub timeout:          Duration,
  pub notification_ttl: Duration,
  pub color:            bool
}

impl Config {
  pub fn defaults() -> Self {
    let mut cfg = Config {
      map:          HashMap::new(),
      loaded_files: vec![]
    };

    cfg.map.insert(
      "api.url".to_string(),
      DEFAULT_API_URL.to_string()
    );
    cfg.map.insert(
      "api.timeout".to_string(),
      "10".to_string()
    );
    cfg.map.insert(
      "notification.ttl".to_string(),
      "3".to_string()
    );
    cfg.map.insert(
      "color".to_string(),
      "on".to_string()
    );

    cfg
  }

  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Self::defaults();

    let rc = resolve_rc_path(
      rc_override
    )?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading deckrc");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no deckrc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn set(
    &mut self,
    key: &str,
    value: impl Into<String>
  ) {
    self
      .map
      .insert(key.to_string(), value.into());
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> Option<bool> {
    self
      .map
      .get(key)
      .map(|v| parse_bool(v))
  }

  pub fn get_secs(
    &self,
    key: &str
  ) -> anyhow::Result<Option<Duration>>
  {
    self
      .map
      .get(key)
      .map(|raw| {
        raw
          .trim()
          .parse::<u64>()
          .map(Duration::from_secs)
          .with_context(|| {
            format!(
              "invalid seconds for \
               {key}: {raw}"
            )
          })
      })
      .transpose()
  }

  pub fn settings(
    &self
  ) -> anyhow::Result<ClientSettings> {
    let api_url = self
      .get("api.url")
      .map(|url| url.trim().to_string())
      .filter(|url| !url.is_empty())
      .ok_or_else(|| {
        anyhow!("api.url must not be empty")
      })?;

    Ok(ClientSettings {
      api_url,
      timeout: self
        .get_secs("api.timeout")?
        .unwrap_or(Duration::from_secs(
          10
        )),
      notification_ttl: self
        .get_secs("notification.ttl")?
        .unwrap_or(
          crate::notify::DEFAULT_NOTIFICATION_TTL
        ),
      color: self
        .get_bool("color")
        .unwrap_or(true)
    })
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let path = fs::canonicalize(&path)
      .unwrap_or(path);

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if line.is_empty()
        || line.starts_with('#')
      {
        continue;
      }

      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        match fs::canonicalize(
          &include_path
        ) {
          | Ok(canonical)
            if self
              .loaded_files
              .contains(&canonical) =>
          {
            warn!(include = %canonical.display(), "include already loaded; skipping");
          }
          | Ok(canonical) => {
            self.load_file(&canonical)?;
          }
          | Err(_) => {
            warn!(include = %include_path.display(), "include file does not exist; skipping");
          }
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var(RC_ENV_VAR)
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping deckrc"
    );
    return Ok(None);
  };
  let candidate =
    home.join(RC_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}
