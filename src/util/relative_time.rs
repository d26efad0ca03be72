use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("timestamp is empty")]
    Empty,

    #[error("unrecognised timestamp '{input}'")]
    Unrecognized { input: String },

    #[error("unknown relative time style '{0}'")]
    UnknownStyle(String),
}

/// Label families used by the fragments.
///
/// All styles bucket the same elapsed-time arithmetic; they differ in
/// wording and in how the absolute fallback date is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeTimeStyle {
    /// `Just now`, `5 mins ago`, `3 hrs ago`, `2 days ago`, `5 Mar`.
    #[default]
    Compact,
    /// Hour-granular: `Just now` below an hour, then `N hours ago`.
    Headline,
    /// Spelled out: `just now`, `5 minutes ago`, `5 March 2024`.
    Sentence,
    /// Day-granular: `Today`, `Yesterday`, `3 days ago`, `5 Mar`.
    Calendar,
}

impl FromStr for RelativeTimeStyle {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(Self::Compact),
            "headline" => Ok(Self::Headline),
            "sentence" => Ok(Self::Sentence),
            "calendar" => Ok(Self::Calendar),
            other => Err(TimeParseError::UnknownStyle(other.to_string())),
        }
    }
}

impl fmt::Display for RelativeTimeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compact => "compact",
            Self::Headline => "headline",
            Self::Sentence => "sentence",
            Self::Calendar => "calendar",
        })
    }
}

/// Whole minutes, hours and days between two instants.
///
/// A reference in the future is clamped to zero elapsed time, so it reads as
/// "just now" rather than producing negative counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Elapsed {
    minutes: i64,
    hours: i64,
    days: i64,
}

impl Elapsed {
    fn between(reference: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let diff_ms = (now - reference).num_milliseconds().max(0);
        Self {
            minutes: diff_ms / MS_PER_MINUTE,
            hours: diff_ms / MS_PER_HOUR,
            days: diff_ms / MS_PER_DAY,
        }
    }
}

fn plural(count: i64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl RelativeTimeStyle {
    pub fn format(self, reference: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let elapsed = Elapsed::between(reference, now);
        let other_year = reference.year() != now.year();

        match self {
            Self::Compact => {
                let Elapsed { minutes, hours, days } = elapsed;
                if minutes < 1 {
                    "Just now".to_string()
                } else if minutes < 60 {
                    format!("{minutes} min{} ago", plural(minutes))
                } else if hours < 24 {
                    format!("{hours} hr{} ago", plural(hours))
                } else if days < 7 {
                    format!("{days} day{} ago", plural(days))
                } else {
                    absolute_date(reference, "%b", other_year)
                }
            }
            Self::Headline => {
                let Elapsed { hours, days, .. } = elapsed;
                if hours < 1 {
                    "Just now".to_string()
                } else if hours < 24 {
                    format!("{hours} hour{} ago", plural(hours))
                } else if days < 7 {
                    format!("{days} day{} ago", plural(days))
                } else {
                    absolute_date(reference, "%b", days > 365)
                }
            }
            Self::Sentence => {
                let Elapsed { minutes, hours, days } = elapsed;
                if minutes < 1 {
                    "just now".to_string()
                } else if minutes < 60 {
                    format!("{minutes} minute{} ago", plural(minutes))
                } else if hours < 24 {
                    format!("{hours} hour{} ago", plural(hours))
                } else if days < 7 {
                    format!("{days} day{} ago", plural(days))
                } else {
                    absolute_date(reference, "%B", other_year)
                }
            }
            Self::Calendar => match elapsed.days {
                0 => "Today".to_string(),
                1 => "Yesterday".to_string(),
                days if days < 7 => format!("{days} days ago"),
                _ => absolute_date(reference, "%b", false),
            },
        }
    }
}

/// Day, month and optionally year in en-GB order, e.g. `5 Mar 2024`.
fn absolute_date(date: DateTime<Utc>, month: &str, with_year: bool) -> String {
    let pattern = if with_year {
        format!("%-d {month} %Y")
    } else {
        format!("%-d {month}")
    };
    date.format(&pattern).to_string()
}

/// Compact label for `reference` as seen at `now`.
pub fn format_relative_time(reference: DateTime<Utc>, now: DateTime<Utc>) -> String {
    RelativeTimeStyle::Compact.format(reference, now)
}

/// True for compact labels that will change within the next day and so
/// are worth refreshing.
pub fn is_recent_label(label: &str) -> bool {
    label == "Just now" || label.contains("min") || label.contains("hr")
}

/// Parse a `datetime` attribute value.
///
/// Accepts RFC 3339, a bare `YYYY-MM-DDTHH:MM:SS` (read as UTC) and a bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(TimeParseError::Unrecognized {
        input: trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn ago(delta: TimeDelta) -> DateTime<Utc> {
        now() - delta
    }

    #[test]
    fn compact_buckets() {
        let f = |d| format_relative_time(ago(d), now());
        assert_eq!(f(TimeDelta::seconds(30)), "Just now");
        assert_eq!(f(TimeDelta::seconds(59)), "Just now");
        assert_eq!(f(TimeDelta::minutes(1)), "1 min ago");
        assert_eq!(f(TimeDelta::minutes(5)), "5 mins ago");
        assert_eq!(f(TimeDelta::minutes(59)), "59 mins ago");
        assert_eq!(f(TimeDelta::minutes(60)), "1 hr ago");
        assert_eq!(f(TimeDelta::hours(23)), "23 hrs ago");
        assert_eq!(f(TimeDelta::hours(25)), "1 day ago");
        assert_eq!(f(TimeDelta::days(6)), "6 days ago");
    }

    #[test]
    fn compact_absolute_date_omits_current_year() {
        assert_eq!(format_relative_time(ago(TimeDelta::days(10)), now()), "5 Jun");
    }

    #[test]
    fn compact_absolute_date_includes_other_year() {
        assert_eq!(
            format_relative_time(ago(TimeDelta::days(400)), now()),
            "11 May 2024"
        );
    }

    #[test]
    fn future_reference_clamps_to_just_now() {
        assert_eq!(format_relative_time(now() + TimeDelta::hours(3), now()), "Just now");
        assert_eq!(
            RelativeTimeStyle::Calendar.format(now() + TimeDelta::days(3), now()),
            "Today"
        );
    }

    #[test]
    fn headline_is_hour_granular() {
        let f = |d| RelativeTimeStyle::Headline.format(ago(d), now());
        assert_eq!(f(TimeDelta::minutes(59)), "Just now");
        assert_eq!(f(TimeDelta::hours(1)), "1 hour ago");
        assert_eq!(f(TimeDelta::hours(2)), "2 hours ago");
        assert_eq!(f(TimeDelta::days(3)), "3 days ago");
        assert_eq!(f(TimeDelta::days(30)), "16 May");
        assert_eq!(f(TimeDelta::days(366)), "14 Jun 2024");
    }

    #[test]
    fn sentence_spells_units_and_months() {
        let f = |d| RelativeTimeStyle::Sentence.format(ago(d), now());
        assert_eq!(f(TimeDelta::seconds(1)), "just now");
        assert_eq!(f(TimeDelta::minutes(1)), "1 minute ago");
        assert_eq!(f(TimeDelta::hours(5)), "5 hours ago");
        assert_eq!(f(TimeDelta::days(14)), "1 June");
    }

    #[test]
    fn calendar_counts_days() {
        let f = |d| RelativeTimeStyle::Calendar.format(ago(d), now());
        assert_eq!(f(TimeDelta::hours(23)), "Today");
        assert_eq!(f(TimeDelta::hours(24)), "Yesterday");
        assert_eq!(f(TimeDelta::days(4)), "4 days ago");
        assert_eq!(f(TimeDelta::days(400)), "11 May");
    }

    #[test]
    fn recent_labels() {
        assert!(is_recent_label("Just now"));
        assert!(is_recent_label("4 mins ago"));
        assert!(is_recent_label("1 hr ago"));
        assert!(!is_recent_label("2 days ago"));
        assert!(!is_recent_label("5 Jun"));
    }

    #[test]
    fn parses_supported_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 5, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-05T09:30:00Z"), Ok(expected));
        assert_eq!(parse_timestamp("2025-03-05T10:30:00+01:00"), Ok(expected));
        assert_eq!(parse_timestamp(" 2025-03-05T09:30:00 "), Ok(expected));
        assert_eq!(
            parse_timestamp("2025-03-05"),
            Ok(Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn rejects_malformed_timestamps() {
        assert_eq!(parse_timestamp("   "), Err(TimeParseError::Empty));
        assert!(matches!(
            parse_timestamp("yesterday-ish"),
            Err(TimeParseError::Unrecognized { .. })
        ));
    }
}
