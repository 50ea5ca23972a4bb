use chrono::{
  DateTime,
  Local,
  NaiveDateTime
};

/// Minute-precision local date-time, the
/// shape a `datetime-local` form field
/// holds.
pub const INPUT_FORMAT: &str =
  "%Y-%m-%dT%H:%M";

const INPUT_WIDTH: usize = 16;

const ACCEPTED_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%d %H:%M"
];

#[must_use]
pub fn local_now() -> NaiveDateTime {
  Local::now().naive_local()
}

/// Parses a deadline as the backend or a
/// user writes it. Values with an offset
/// are converted to local time.
#[must_use]
pub fn parse_deadline(
  raw: &str
) -> Option<NaiveDateTime> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  for format in ACCEPTED_FORMATS {
    if let Ok(parsed) =
      NaiveDateTime::parse_from_str(
        trimmed, format
      )
    {
      return Some(parsed);
    }
  }

  match DateTime::parse_from_rfc3339(
    trimmed
  ) {
    | Ok(parsed) => Some(
      parsed
        .with_timezone(&Local)
        .naive_local()
    ),
    | Err(err) => {
      tracing::debug!(
        value = %trimmed,
        error = %err,
        "unparseable deadline"
      );
      None
    }
  }
}

/// Stored deadline as a form-field value.
/// Offset-bearing values are shown in local
/// time, the same instant `parse_deadline`
/// reports; anything unparseable is cut to
/// minute width as-is.
#[must_use]
pub fn to_input_value(
  raw: &str
) -> String {
  match parse_deadline(raw) {
    | Some(value) => to_input_format(value),
    | None => raw
      .trim()
      .chars()
      .take(INPUT_WIDTH)
      .collect()
  }
}

/// Canonical form-field value for a
/// parseable deadline.
#[must_use]
pub fn to_input_format(
  value: NaiveDateTime
) -> String {
  value.format(INPUT_FORMAT).to_string()
}

/// Human-readable deadline, e.g.
/// `Jan 5, 2026, 03:30 PM`.
#[must_use]
pub fn format_deadline(
  raw: &str
) -> Option<String> {
  parse_deadline(raw).map(|value| {
    value
      .format("%b %-d, %Y, %I:%M %p")
      .to_string()
  })
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn at(
    y: i32,
    m: u32,
    d: u32,
    hh: u32,
    mm: u32
  ) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
      .and_then(|date| {
        date.and_hms_opt(hh, mm, 0)
      })
      .expect("valid date")
  }

  #[test]
  fn parses_backend_seconds_and_fraction()
  {
    assert_eq!(
      parse_deadline(
        "2026-03-01T09:30:15.250"
      )
      .map(to_input_format),
      Some("2026-03-01T09:30".to_string())
    );
  }

  #[test]
  fn parses_space_separated_input() {
    assert_eq!(
      parse_deadline("2026-03-01 18:05"),
      Some(at(2026, 3, 1, 18, 5))
    );
  }

  #[test]
  fn rejects_garbage_and_blank() {
    assert_eq!(
      parse_deadline("next tuesday"),
      None
    );
    assert_eq!(parse_deadline("   "), None);
  }

  #[test]
  fn input_value_keeps_minute_precision()
  {
    assert_eq!(
      to_input_value(
        "2026-03-01T09:30:00.000"
      ),
      "2026-03-01T09:30"
    );
    assert_eq!(
      to_input_value("2026-03-01"),
      "2026-03-01"
    );
  }

  #[test]
  fn input_value_of_offset_deadline_is_local()
  {
    let raw = "2026-03-01T09:30:00Z";
    let expected =
      DateTime::parse_from_rfc3339(raw)
        .expect("rfc3339")
        .with_timezone(&Local)
        .naive_local();

    assert_eq!(
      to_input_value(raw),
      to_input_format(expected)
    );
    assert_eq!(
      parse_deadline(&to_input_value(raw)),
      Some(expected)
    );
  }

  #[test]
  fn formats_deadline_for_display() {
    assert_eq!(
      format_deadline(
        "2026-01-05T15:30:00"
      )
      .as_deref(),
      Some("Jan 5, 2026, 03:30 PM")
    );
    assert_eq!(
      format_deadline("soon"),
      None
    );
  }
}
