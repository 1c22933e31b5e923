//! Binary document (PDF) text extraction through an external converter
//!
//! The document bytes are written to a uniquely named temp file, the
//! converter is run as `<tool> [args..] <path>`, and its stdout is the
//! extracted text. The run is raced against a deadline; the child process
//! is killed if the deadline wins, and the temp file is removed on every
//! exit path when its guard drops.

use async_trait::async_trait;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::config::ContentFetchConfig;
use super::types::ExtractError;

/// Placeholder in converter arguments replaced by the temp file path
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Maximum stderr characters echoed into logs
const STDERR_LOG_CHARS: usize = 500;

/// Captured result of one converter run
#[derive(Debug, Clone, Default)]
pub struct ConverterOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub success: bool,
}

/// Command contract for turning a document file into text
///
/// The converter reads the file at `path` and reports what it wrote to
/// stdout and stderr. A non-zero exit is reported through
/// [`ConverterOutput::success`], not as an error.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, path: &Path) -> Result<ConverterOutput, ExtractError>;

    /// Converter name for logging
    fn name(&self) -> &str;
}

/// Runs an external program as the converter
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    /// Converter invoked as `<program> <path>`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Set arguments; `{path}` marks where the file path goes, otherwise it
    /// is appended last
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Build the converter described by content configuration
    pub fn from_config(config: &ContentFetchConfig) -> Self {
        Self::new(config.pdf_tool.clone()).with_args(config.pdf_tool_args.clone())
    }

    /// Final argument list for a given input file
    pub fn command_args(&self, path: &Path) -> Vec<String> {
        let path = path.to_string_lossy();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(PATH_PLACEHOLDER, &path))
            .collect();
        if !self.args.iter().any(|a| a.contains(PATH_PLACEHOLDER)) {
            args.push(path.into_owned());
        }
        args
    }
}

#[async_trait]
impl DocumentConverter for CommandConverter {
    async fn convert(&self, path: &Path) -> Result<ConverterOutput, ExtractError> {
        let output = Command::new(&self.program)
            .args(self.command_args(path))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ExtractError::Subprocess(format!("failed to launch {}: {}", self.program, e))
            })?;

        Ok(ConverterOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
            success: output.status.success(),
        })
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Extracts text from binary documents with a bounded converter run
#[derive(Clone)]
pub struct BinaryExtractor {
    converter: Arc<dyn DocumentConverter>,
    timeout: Duration,
}

impl BinaryExtractor {
    pub fn new(converter: Arc<dyn DocumentConverter>, timeout: Duration) -> Self {
        Self { converter, timeout }
    }

    /// Extract text from document bytes
    ///
    /// Returns the trimmed converter output, or `None` on launch failure,
    /// abnormal exit, empty output, timeout or temp file errors.
    pub async fn extract_binary_text(&self, bytes: &[u8]) -> Option<String> {
        match self.try_extract(bytes).await {
            Ok(text) => {
                debug!(
                    target: "search.pdf",
                    converter = self.converter.name(),
                    chars = text.chars().count(),
                    "Converted binary document"
                );
                Some(text)
            }
            Err(e) => {
                warn!(
                    target: "search.pdf",
                    converter = self.converter.name(),
                    error = %e,
                    "Binary document extraction failed"
                );
                None
            }
        }
    }

    async fn try_extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let temp = write_temp_document(bytes)?;

        let outcome = timeout(self.timeout, self.converter.convert(temp.path())).await;

        // Removed here on the normal paths; the guard's Drop covers unwinding
        let cleanup = temp.close();

        let output = outcome.map_err(|_| ExtractError::Timeout {
            stage: "binary",
            timeout_ms: self.timeout.as_millis() as u64,
        })??;
        cleanup?;

        let stderr = output.stderr.trim();
        if !stderr.is_empty() {
            warn!(
                target: "search.pdf",
                converter = self.converter.name(),
                stderr = %stderr.chars().take(STDERR_LOG_CHARS).collect::<String>(),
                "Converter wrote diagnostics"
            );
        }

        if !output.success {
            return Err(ExtractError::Subprocess(format!(
                "{} exited with status {:?}",
                self.converter.name(),
                output.exit_code
            )));
        }

        let text = output.stdout.trim();
        if text.is_empty() {
            return Err(ExtractError::ExtractionFailure(
                "converter produced no text".to_string(),
            ));
        }

        Ok(text.to_string())
    }
}

fn write_temp_document(bytes: &[u8]) -> Result<tempfile::NamedTempFile, ExtractError> {
    let mut temp = tempfile::Builder::new()
        .prefix("search-doc-")
        .suffix(".pdf")
        .tempfile()?;
    temp.write_all(bytes)?;
    temp.flush()?;
    Ok(temp)
}
