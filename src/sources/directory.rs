use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

use super::{TranscriptSource, TransportError};
use crate::transcript::TimedTextEntry;

/// Reads transcripts saved as `<dir>/<video_id>.<language>.json`
pub struct DirectoryTranscriptSource {
    root: PathBuf,
}

/// Caption entry shapes accepted on disk
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Seconds {
        start: f64,
        duration: f64,
        text: String,
    },
    Abbreviated {
        start: f64,
        dur: f64,
        text: String,
    },
    Millis {
        #[serde(rename = "tStartMs")]
        start_ms: u64,
        #[serde(rename = "dDurationMs", default)]
        duration_ms: u64,
        text: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTranscript {
    List(Vec<RawEntry>),
    Snippets { snippets: Vec<RawEntry> },
}

impl RawEntry {
    fn normalize(self) -> Result<TimedTextEntry, TransportError> {
        let (start, duration, text) = match self {
            RawEntry::Seconds { start, duration, text } => (start, duration, text),
            RawEntry::Abbreviated { start, dur, text } => (start, dur, text),
            RawEntry::Millis {
                start_ms,
                duration_ms,
                text,
            } => (start_ms as f64 / 1000.0, duration_ms as f64 / 1000.0, text),
        };

        if !(start >= 0.0 && duration >= 0.0) {
            return Err(TransportError::Malformed(format!(
                "negative timing in entry '{}'",
                text.trim()
            )));
        }

        Ok(TimedTextEntry::new(start, duration, text))
    }
}

impl DirectoryTranscriptSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn transcript_path(&self, video_id: &str, language: &str) -> Result<PathBuf, TransportError> {
        let unsafe_part = |part: &str| part.is_empty() || part.contains(['/', '\\']) || part.contains("..");
        if unsafe_part(video_id) || unsafe_part(language) {
            return Err(TransportError::Malformed(format!(
                "refusing transcript path for '{}' / '{}'",
                video_id, language
            )));
        }
        Ok(self.root.join(format!("{}.{}.json", video_id, language)))
    }
}

/// Parse a saved transcript document
pub(crate) fn parse_entries(content: &str) -> Result<Vec<TimedTextEntry>, TransportError> {
    let raw: RawTranscript =
        serde_json::from_str(content).map_err(|e| TransportError::Malformed(e.to_string()))?;
    let entries = match raw {
        RawTranscript::List(entries) => entries,
        RawTranscript::Snippets { snippets } => snippets,
    };
    entries.into_iter().map(RawEntry::normalize).collect()
}

#[async_trait]
impl TranscriptSource for DirectoryTranscriptSource {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TimedTextEntry>, TransportError> {
        for language in languages {
            let path = self.transcript_path(video_id, language)?;
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    tracing::debug!("Reading transcript file: {}", path.display());
                    return parse_entries(&content);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(TransportError::LanguageUnavailable(languages.join(",")))
    }

    fn source_name(&self) -> &'static str {
        "directory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_shapes() {
        let content = r#"[
            {"start": 370.0, "duration": 5.0, "text": "a"},
            {"start": 390, "dur": 4, "text": "b"},
            {"tStartMs": 420000, "dDurationMs": 2000, "text": "c"}
        ]"#;

        let entries = parse_entries(content).unwrap();

        assert_eq!(
            entries,
            vec![
                TimedTextEntry::new(370.0, 5.0, "a"),
                TimedTextEntry::new(390.0, 4.0, "b"),
                TimedTextEntry::new(420.0, 2.0, "c"),
            ]
        );
    }

    #[test]
    fn test_parse_snippets_wrapper() {
        let content = r#"{"snippets": [{"start": 1.5, "duration": 2.0, "text": "hi"}]}"#;
        let entries = parse_entries(content).unwrap();
        assert_eq!(entries, vec![TimedTextEntry::new(1.5, 2.0, "hi")]);
    }

    #[test]
    fn test_parse_rejects_negative_timing() {
        let content = r#"[{"start": -1.0, "duration": 2.0, "text": "bad"}]"#;
        assert!(matches!(parse_entries(content), Err(TransportError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_fetch_by_language() {
        let dir = tempfile::TempDir::new().unwrap();
        fs_err::write(
            dir.path().join("AqEN8qOcAcA.ko.json"),
            r#"[{"start": 370.0, "duration": 5.0, "text": "annyeong"}]"#,
        )
        .unwrap();
        let source = DirectoryTranscriptSource::new(dir.path());

        let missing = source.fetch("AqEN8qOcAcA", &["en".to_string()]).await;
        assert_eq!(missing, Err(TransportError::LanguageUnavailable("en".to_string())));

        let found = source
            .fetch("AqEN8qOcAcA", &["en".to_string(), "ko".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "annyeong");
    }

    #[tokio::test]
    async fn test_fetch_rejects_path_traversal() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = DirectoryTranscriptSource::new(dir.path());
        let result = source.fetch("../etc/passwd", &["en".to_string()]).await;
        assert!(matches!(result, Err(TransportError::Malformed(_))));
    }
}
