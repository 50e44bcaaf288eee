//! Timestamp Rendering

use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use serde::Deserialize;

use super::{PayloadSource, RenderResult};

/// How the current time is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `2024-05-01T12:30:00+02:00`
    #[default]
    Rfc3339,
    /// `2024/05/01 12:30:00`
    Datetime,
}

impl TimeFormat {
    /// Format a point in time
    pub fn format<Tz>(&self, at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        match self {
            TimeFormat::Rfc3339 => at.to_rfc3339_opts(SecondsFormat::Secs, true),
            TimeFormat::Datetime => at.format("%Y/%m/%d %H:%M:%S").to_string(),
        }
    }

    /// Format the current local time
    pub fn now(&self) -> String {
        self.format(&Local::now())
    }
}

/// Pushes the current time as plain text
#[derive(Debug, Clone, Default)]
pub struct TimestampClock {
    format: TimeFormat,
}

impl TimestampClock {
    pub fn new(format: TimeFormat) -> Self {
        Self { format }
    }
}

impl PayloadSource for TimestampClock {
    fn render(&self) -> RenderResult<String> {
        Ok(self.format.now())
    }
}

/// Escape text for inclusion in markup or a quoted script string
pub(crate) fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
