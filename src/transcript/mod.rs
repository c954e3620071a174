use serde::{Deserialize, Serialize};

pub mod filter;
pub mod resolver;

pub use filter::{select_segments, OverlapFilter};
pub use resolver::SegmentResolver;

use crate::sources::TransportError;
use crate::time::{format_clock, MalformedTimeError, TimeWindow};

/// One caption as delivered by a transcript source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedTextEntry {
    /// Start offset in seconds
    pub start_offset: f64,

    /// Duration in seconds
    pub duration: f64,

    /// Caption text, untrimmed
    pub text: String,
}

impl TimedTextEntry {
    pub fn new(start_offset: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start_offset,
            duration,
            text: text.into(),
        }
    }

    pub fn end_offset(&self) -> f64 {
        self.start_offset + self.duration
    }
}

/// A caption that overlaps the requested window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// `MM:SS` of the caption start
    pub display_time: String,

    /// Caption text with surrounding whitespace stripped
    pub text: String,
}

impl Segment {
    pub fn from_entry(entry: &TimedTextEntry) -> Self {
        Self {
            display_time: format_clock(entry.start_offset),
            text: entry.text.trim().to_string(),
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.display_time, self.text)
    }
}

/// Result of trying one language
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Fetched { entries: usize },
    Failed { reason: TransportError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageAttempt {
    pub language: String,
    pub outcome: AttemptOutcome,
}

impl LanguageAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Fetched { .. })
    }
}

/// Segments resolved for one video and window
#[derive(Debug, Clone)]
pub struct Resolution {
    pub video_id: String,

    /// Language whose transcript was used
    pub language: String,

    pub window: TimeWindow,

    /// Overlapping captions in source order
    pub segments: Vec<Segment>,

    /// Every language tried, in order, ending with the one that succeeded
    pub attempts: Vec<LanguageAttempt>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// `[MM:SS] text` lines joined with newlines
    pub fn to_lines(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    MalformedTime(#[from] MalformedTimeError),

    #[error("No transcript available")]
    NoTranscriptAvailable {
        video_id: String,
        attempts: Vec<LanguageAttempt>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_from_entry() {
        let entry = TimedTextEntry::new(370.6, 5.0, "  hello there \n");
        let segment = Segment::from_entry(&entry);
        assert_eq!(segment.display_time, "06:10");
        assert_eq!(segment.text, "hello there");
        assert_eq!(segment.to_string(), "[06:10] hello there");
    }

    #[test]
    fn test_resolution_lines() {
        let resolution = Resolution {
            video_id: "AqEN8qOcAcA".to_string(),
            language: "ko".to_string(),
            window: TimeWindow::new(373, 390),
            segments: vec![
                Segment::from_entry(&TimedTextEntry::new(370.0, 5.0, "a")),
                Segment::from_entry(&TimedTextEntry::new(390.0, 4.0, "b")),
            ],
            attempts: Vec::new(),
        };
        assert_eq!(resolution.to_lines(), "[06:10] a\n[06:30] b");
        assert!(!resolution.is_empty());
    }
}
