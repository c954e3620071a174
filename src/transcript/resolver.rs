use super::{select_segments, AttemptOutcome, LanguageAttempt, Resolution, ResolveError, TimedTextEntry};
use crate::sources::TranscriptSource;
use crate::time::TimeWindow;

/// Caption languages tried when nothing else is configured, in order
pub const DEFAULT_LANGUAGES: [&str; 7] = ["en", "ko", "ja", "zh-Hans", "es", "fr", "de"];

/// Transcript obtained from the first language that worked
#[derive(Debug, Clone)]
pub struct FetchedTranscript {
    pub language: String,
    pub entries: Vec<TimedTextEntry>,
    pub attempts: Vec<LanguageAttempt>,
}

/// Resolves the transcript segments overlapping a time window
pub struct SegmentResolver {
    source: Box<dyn TranscriptSource>,
    languages: Vec<String>,
}

impl SegmentResolver {
    pub fn new(source: Box<dyn TranscriptSource>, languages: Vec<String>) -> Self {
        Self { source, languages }
    }

    pub fn with_default_languages(source: Box<dyn TranscriptSource>) -> Self {
        Self::new(
            source,
            DEFAULT_LANGUAGES.iter().map(|lang| lang.to_string()).collect(),
        )
    }

    /// Try each configured language in order, stopping at the first success
    pub async fn fetch_first_available(&self, video_id: &str) -> Result<FetchedTranscript, ResolveError> {
        let mut attempts = Vec::with_capacity(self.languages.len());

        for language in &self.languages {
            let requested = std::slice::from_ref(language);
            match self.source.fetch(video_id, requested).await {
                Ok(entries) => {
                    tracing::info!(
                        "Using {} transcript for {} from {} ({} entries)",
                        language,
                        video_id,
                        self.source.source_name(),
                        entries.len()
                    );
                    attempts.push(LanguageAttempt {
                        language: language.clone(),
                        outcome: AttemptOutcome::Fetched {
                            entries: entries.len(),
                        },
                    });
                    return Ok(FetchedTranscript {
                        language: language.clone(),
                        entries,
                        attempts,
                    });
                }
                Err(reason) => {
                    tracing::debug!("No {} transcript for {}: {}", language, video_id, reason);
                    attempts.push(LanguageAttempt {
                        language: language.clone(),
                        outcome: AttemptOutcome::Failed { reason },
                    });
                }
            }
        }

        tracing::warn!(
            "No transcript available for {} after trying {} language(s)",
            video_id,
            attempts.len()
        );
        Err(ResolveError::NoTranscriptAvailable {
            video_id: video_id.to_string(),
            attempts,
        })
    }

    /// Resolve the segments of `video_id` overlapping `[start_clock, end_clock]`.
    ///
    /// Clock strings are parsed before any fetch is made. An empty segment list
    /// means a transcript exists but nothing falls inside the window.
    pub async fn resolve(
        &self,
        video_id: &str,
        start_clock: &str,
        end_clock: &str,
    ) -> Result<Resolution, ResolveError> {
        let window = TimeWindow::parse(start_clock, end_clock)?;
        tracing::debug!("Resolving {} for window {}", video_id, window);

        let fetched = self.fetch_first_available(video_id).await?;
        let segments = select_segments(&fetched.entries, window).collect();

        Ok(Resolution {
            video_id: video_id.to_string(),
            language: fetched.language,
            window,
            segments,
            attempts: fetched.attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{MockTranscriptSource, TransportError};

    fn sample() -> Vec<TimedTextEntry> {
        vec![
            TimedTextEntry::new(370.0, 5.0, "a"),
            TimedTextEntry::new(390.0, 4.0, " b "),
            TimedTextEntry::new(420.0, 2.0, "c"),
        ]
    }

    fn mock_with<F>(respond: F) -> MockTranscriptSource
    where
        F: Fn(&str) -> Result<Vec<TimedTextEntry>, TransportError> + Send + 'static,
    {
        let mut source = MockTranscriptSource::new();
        source
            .expect_fetch()
            .returning(move |_, languages| respond(languages[0].as_str()));
        source.expect_source_name().return_const("mock");
        source
    }

    #[tokio::test]
    async fn test_resolve_window() {
        let source = mock_with(|_| Ok(sample()));
        let resolver = SegmentResolver::with_default_languages(Box::new(source));

        let resolution = resolver.resolve("AqEN8qOcAcA", "06:13", "06:30").await.unwrap();

        assert_eq!(resolution.language, "en");
        assert_eq!(resolution.window, TimeWindow::new(373, 390));
        assert_eq!(resolution.to_lines(), "[06:10] a\n[06:30] b");
        assert_eq!(resolution.attempts.len(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_through_languages() {
        let source = mock_with(|language| match language {
            "ko" => Ok(sample()),
            other => Err(TransportError::LanguageUnavailable(other.to_string())),
        });
        let resolver = SegmentResolver::with_default_languages(Box::new(source));

        let resolution = resolver.resolve("AqEN8qOcAcA", "00:06:13", "00:06:30").await.unwrap();

        assert_eq!(resolution.language, "ko");
        let tried: Vec<&str> = resolution.attempts.iter().map(|a| a.language.as_str()).collect();
        assert_eq!(tried, vec!["en", "ko"]);
        assert!(!resolution.attempts[0].succeeded());
        assert!(resolution.attempts[1].succeeded());
    }

    #[tokio::test]
    async fn test_transport_errors_are_swallowed() {
        let source = mock_with(|language| match language {
            "en" => Err(TransportError::ToolFailed {
                tool: "yt-dlp".to_string(),
                message: "network unreachable".to_string(),
            }),
            "ko" => Err(TransportError::Malformed("bad json".to_string())),
            _ => Ok(sample()),
        });
        let resolver = SegmentResolver::with_default_languages(Box::new(source));

        let resolution = resolver.resolve("id", "06:13", "06:30").await.unwrap();

        assert_eq!(resolution.language, "ja");
        assert_eq!(
            resolution.attempts[1].outcome,
            AttemptOutcome::Failed {
                reason: TransportError::Malformed("bad json".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_no_transcript_after_all_languages() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_fetch()
            .times(7)
            .returning(|_, languages| Err(TransportError::LanguageUnavailable(languages[0].clone())));
        source.expect_source_name().return_const("mock");
        let resolver = SegmentResolver::with_default_languages(Box::new(source));

        let err = resolver.resolve("id", "06:13", "06:30").await.unwrap_err();

        match err {
            ResolveError::NoTranscriptAvailable { video_id, attempts } => {
                assert_eq!(video_id, "id");
                let tried: Vec<&str> = attempts.iter().map(|a| a.language.as_str()).collect();
                assert_eq!(tried, DEFAULT_LANGUAGES.to_vec());
                assert!(attempts.iter().all(|a| !a.succeeded()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stops_after_first_success() {
        let mut source = MockTranscriptSource::new();
        source.expect_fetch().times(1).returning(|_, _| Ok(sample()));
        source.expect_source_name().return_const("mock");
        let resolver = SegmentResolver::with_default_languages(Box::new(source));

        resolver.resolve("id", "00:00", "10:00").await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_time_skips_fetch() {
        let mut source = MockTranscriptSource::new();
        source.expect_fetch().never();
        source.expect_source_name().return_const("mock");
        let resolver = SegmentResolver::with_default_languages(Box::new(source));

        for (start, end) in [("abc", "06:30"), ("06:13", "1:2:3:4")] {
            let err = resolver.resolve("id", start, end).await.unwrap_err();
            assert!(matches!(err, ResolveError::MalformedTime(_)));
        }
    }

    #[tokio::test]
    async fn test_inverted_window_is_empty_not_error() {
        let source = mock_with(|_| {
            Ok(vec![
                TimedTextEntry::new(300.0, 120.0, "long"),
                TimedTextEntry::new(380.0, 2.0, "short"),
            ])
        });
        let resolver = SegmentResolver::with_default_languages(Box::new(source));

        let resolution = resolver.resolve("id", "06:30", "06:13").await.unwrap();

        assert!(resolution.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_is_repeatable() {
        let source = mock_with(|_| Ok(sample()));
        let resolver = SegmentResolver::with_default_languages(Box::new(source));

        let first = resolver.resolve("id", "06:13", "06:30").await.unwrap();
        let second = resolver.resolve("id", "06:13", "06:30").await.unwrap();

        assert_eq!(first.segments, second.segments);
    }

    #[tokio::test]
    async fn test_empty_language_list() {
        let mut source = MockTranscriptSource::new();
        source.expect_fetch().never();
        let resolver = SegmentResolver::new(Box::new(source), Vec::new());

        let err = resolver.fetch_first_available("id").await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NoTranscriptAvailable { ref attempts, .. } if attempts.is_empty()
        ));
    }
}
