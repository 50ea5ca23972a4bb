use std::fmt;
use std::str::FromStr;

use serde::{
  Deserialize,
  Serialize
};

/// Server-assigned task identifier.
/// Clients never construct one except
/// by parsing user input that names an
/// existing task.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for TaskId {
  type Err = std::num::ParseIntError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    s.trim().parse::<u64>().map(TaskId)
  }
}

/// A task as the backend returns it.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
  pub id:          TaskId,
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub completed:   bool,
  #[serde(default)]
  pub deadline:    Option<String>,
  #[serde(default)]
  pub created_at:  Option<String>,
  #[serde(default)]
  pub status:      Option<String>
}

/// Body of a create or update request.
/// Carries only the editable fields;
/// status is always derived.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskPayload {
  pub title:       String,
  pub description: String,
  pub completed:   bool,
  pub deadline:    Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
)]
pub struct ApiErrorBody {
  #[serde(default)]
  pub message: Option<String>
}
