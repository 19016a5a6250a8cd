//! OCR extraction for image uploads via the tesseract command

use std::path::Path;
use std::process::Command;

use crate::config::OcrConfig;
use crate::error::{Error, Result};

/// Wraps a tesseract invocation for image files.
///
/// Tesseract performs its own grayscale conversion during preprocessing, so
/// images are handed over as-is.
pub struct OcrEngine {
    config: OcrConfig,
}

impl OcrEngine {
    /// Create a new OCR engine
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Check whether OCR is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Run tesseract against the image at `path` and return recognized text
    pub fn extract_text(&self, path: &Path) -> Result<String> {
        if !self.config.enabled {
            return Err(Error::internal("OCR is disabled"));
        }

        let output = Command::new(&self.config.command)
            .arg(path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .output()
            .map_err(|e| {
                Error::internal(format!(
                    "Failed to run {}: {}",
                    self.config.command, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::file_parse(
                path.display().to_string(),
                format!("tesseract exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
