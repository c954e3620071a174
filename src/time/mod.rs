//! Clock string conversion (`MM:SS` / `HH:MM:SS` <-> seconds)

use serde::{Deserialize, Serialize};

/// A clock string could not be turned into seconds
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid time format '{input}': {reason}")]
pub struct MalformedTimeError {
    pub input: String,
    pub reason: String,
}

impl MalformedTimeError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parse `MM:SS` or `HH:MM:SS` into whole seconds.
///
/// Seconds must lie in `0..=59`. Minutes are unbounded in the two-component
/// form (so `"99:30"` is 99 minutes 30 seconds) and must lie in `0..=59`
/// once an hours component is present.
pub fn parse_clock(input: &str) -> Result<u64, MalformedTimeError> {
    let trimmed = input.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (None, component(input, m)?, component(input, s)?),
        [h, m, s] => (
            Some(component(input, h)?),
            component(input, m)?,
            component(input, s)?,
        ),
        _ => {
            return Err(MalformedTimeError::new(
                input,
                format!("expected MM:SS or HH:MM:SS, got {} component(s)", parts.len()),
            ))
        }
    };

    if seconds > 59 {
        return Err(MalformedTimeError::new(input, "seconds must be between 0 and 59"));
    }
    if hours.is_some() && minutes > 59 {
        return Err(MalformedTimeError::new(input, "minutes must be between 0 and 59"));
    }

    hours
        .unwrap_or(0)
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(|| MalformedTimeError::new(input, "value is too large"))
}

fn component(input: &str, part: &str) -> Result<u64, MalformedTimeError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MalformedTimeError::new(
            input,
            format!("'{}' is not a number", part),
        ));
    }
    part.parse::<u64>()
        .map_err(|_| MalformedTimeError::new(input, "value is too large"))
}

/// Render seconds as `MM:SS`, truncating fractions.
///
/// Minutes are not wrapped into hours, so 3725 seconds renders as `62:05`.
pub fn format_clock(total_seconds: f64) -> String {
    let total = whole_seconds(total_seconds);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Render seconds as `HH:MM:SS`
pub fn format_clock_hms(total_seconds: f64) -> String {
    let total = whole_seconds(total_seconds);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Render a media duration as `M:SS` for display next to a title
pub fn format_duration_short(total_seconds: f64) -> String {
    let total = whole_seconds(total_seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

fn whole_seconds(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.trunc() as u64
    }
}

/// Where a caption sits relative to a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Ends before the window opens
    Before,
    /// Shares at least one instant with the window
    Overlaps,
    /// Starts after the window closes
    After,
}

/// Inclusive `[start_seconds, end_seconds]` range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_seconds: u64,
    pub end_seconds: u64,
}

impl TimeWindow {
    pub fn new(start_seconds: u64, end_seconds: u64) -> Self {
        Self {
            start_seconds,
            end_seconds,
        }
    }

    /// Build a window from two clock strings.
    ///
    /// A start after the end is accepted here; such a window simply matches nothing.
    pub fn parse(start: &str, end: &str) -> Result<Self, MalformedTimeError> {
        Ok(Self::new(parse_clock(start)?, parse_clock(end)?))
    }

    pub fn is_inverted(&self) -> bool {
        self.start_seconds > self.end_seconds
    }

    pub fn duration_seconds(&self) -> u64 {
        self.end_seconds.saturating_sub(self.start_seconds)
    }

    /// Classify a caption starting at `start_offset` and lasting `duration` seconds
    pub fn place(&self, start_offset: f64, duration: f64) -> Placement {
        let entry_end = start_offset + duration;
        if entry_end < self.start_seconds as f64 {
            Placement::Before
        } else if start_offset > self.end_seconds as f64 {
            Placement::After
        } else {
            Placement::Overlaps
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            format_clock(self.start_seconds as f64),
            format_clock(self.end_seconds as f64)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock_hours_optional() {
        assert_eq!(parse_clock("00:06:13"), Ok(373));
        assert_eq!(parse_clock("06:13"), Ok(373));
        assert_eq!(parse_clock("1:00:00"), Ok(3600));
        assert_eq!(parse_clock("0:00"), Ok(0));
    }

    #[test]
    fn test_parse_clock_rejects_malformed() {
        for input in ["abc", "1:2:3:4", "", "373", "06:", ":13", "6:1a", "-1:30", "+1:30", "1 :30"] {
            assert!(parse_clock(input).is_err(), "{:?} should be rejected", input);
        }
    }

    #[test]
    fn test_parse_clock_error_keeps_input() {
        let err = parse_clock("1:2:3:4").unwrap_err();
        assert_eq!(err.input, "1:2:3:4");
        assert!(err.to_string().contains("4 component"));
    }

    #[test]
    fn test_parse_clock_range_policy() {
        // seconds are always bounded
        assert!(parse_clock("99:99").is_err());
        assert!(parse_clock("00:60").is_err());
        // minutes only bounded when hours are present
        assert_eq!(parse_clock("99:30"), Ok(99 * 60 + 30));
        assert!(parse_clock("01:60:00").is_err());
        assert_eq!(parse_clock("01:59:59"), Ok(7199));
    }

    #[test]
    fn test_parse_clock_overflow() {
        assert!(parse_clock("99999999999999999999:00").is_err());
        assert!(parse_clock("9999999999999999:00:00").is_err());
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(373.0), "06:13");
        assert_eq!(format_clock(370.9), "06:10");
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(3725.0), "62:05");
        assert_eq!(format_clock(-4.0), "00:00");
    }

    #[test]
    fn test_clock_round_trip() {
        for clock in ["00:00", "06:13", "10:59", "99:59"] {
            let seconds = parse_clock(clock).unwrap();
            assert_eq!(format_clock(seconds as f64), clock);
        }
    }

    #[test]
    fn test_other_formats() {
        assert_eq!(format_clock_hms(3725.0), "01:02:05");
        assert_eq!(format_duration_short(213.0), "3:33");
        assert_eq!(format_duration_short(59.9), "0:59");
    }

    #[test]
    fn test_window_placement() {
        let window = TimeWindow::parse("06:13", "06:30").unwrap();
        assert_eq!(window.place(370.0, 5.0), Placement::Overlaps);
        assert_eq!(window.place(390.0, 4.0), Placement::Overlaps);
        assert_eq!(window.place(420.0, 2.0), Placement::After);
        assert_eq!(window.place(360.0, 2.0), Placement::Before);
        // touching the opening edge still counts
        assert_eq!(window.place(368.0, 5.0), Placement::Overlaps);
    }

    #[test]
    fn test_window_inverted_is_accepted() {
        let window = TimeWindow::parse("06:30", "06:13").unwrap();
        assert!(window.is_inverted());
        assert_eq!(window.duration_seconds(), 0);
        assert_eq!(window.to_string(), "06:30-06:13");
    }
}
