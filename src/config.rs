//! Configuration for a transcription run.
//!
//! All run behaviour is controlled through [`RunConfig`], built via its
//! [`RunConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs, log them, and diff two runs to understand why their
//! outputs differ.
//!
//! The transcription credential is an explicit configuration value rather
//! than an ambient lookup scattered through components: the orchestrator
//! resolves it exactly once at startup and fails fast with
//! [`crate::error::PagescribeError::TranscriberNotConfigured`].

use crate::error::PagescribeError;
use crate::pipeline::transcribe::Transcriber;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default vision model when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// File name of the processing ledger inside the source directory.
pub const LEDGER_FILE_NAME: &str = "processed_log.json";

/// Configuration for a run over one source directory.
///
/// Built via [`RunConfig::builder()`] or [`RunConfig::default()`].
///
/// # Example
/// ```rust
/// use pagescribe::RunConfig;
///
/// let config = RunConfig::builder()
///     .model("gemini-2.0-flash")
///     .inter_page_delay_ms(500)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Vision model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Transcription API key. If `None`, resolution falls back to the
    /// `GEMINI_API_KEY` then `GOOGLE_API_KEY` environment variables.
    pub api_key: Option<String>,

    /// Pre-constructed transcriber. Takes precedence over `api_key`.
    ///
    /// This is the injection seam for tests and for callers that need
    /// custom middleware around the service call.
    pub transcriber: Option<Arc<dyn Transcriber>>,

    /// Pause after every page that required a live transcription call,
    /// in milliseconds. Default: 1000.
    ///
    /// Cache hits never pause — the delay exists purely to bound the
    /// request rate against the external service.
    pub inter_page_delay_ms: u64,

    /// Directory the assembled `.tex`/`.md` documents are written to.
    /// Default: the source directory itself.
    pub output_dir: Option<PathBuf>,

    /// Per-transcription-call HTTP timeout in seconds. Default: 120.
    ///
    /// Handwritten pages routinely take 30–60 s on the slower models;
    /// a short timeout would convert healthy pages into error markers.
    pub api_timeout_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            transcriber: None,
            inter_page_delay_ms: 1000,
            output_dir: None,
            api_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("transcriber", &self.transcriber.as_ref().map(|_| "<dyn Transcriber>"))
            .field("inter_page_delay_ms", &self.inter_page_delay_ms)
            .field("output_dir", &self.output_dir)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.config.transcriber = Some(transcriber);
        self
    }

    pub fn inter_page_delay_ms(mut self, ms: u64) -> Self {
        self.config.inter_page_delay_ms = ms;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RunConfig, PagescribeError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(PagescribeError::InvalidConfig(
                "Model name must not be empty".into(),
            ));
        }
        if let Some(ref key) = c.api_key {
            if key.trim().is_empty() {
                return Err(PagescribeError::InvalidConfig(
                    "API key must not be empty when set".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RunConfig::default();
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.inter_page_delay_ms, 1000);
        assert!(c.api_key.is_none());
        assert!(c.transcriber.is_none());
    }

    #[test]
    fn empty_model_rejected() {
        let err = RunConfig::builder().model("  ").build();
        assert!(matches!(err, Err(PagescribeError::InvalidConfig(_))));
    }

    #[test]
    fn empty_api_key_rejected() {
        let err = RunConfig::builder().api_key("").build();
        assert!(matches!(err, Err(PagescribeError::InvalidConfig(_))));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = RunConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"), "got: {dbg}");
    }
}
