//! Transform step: raw buffer to executable source
//!
//! Everything downstream (tokenizer, segmentation, executor) works on the transformed
//! text, so line numbers in reports refer to it.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::playground::config::TransformConfig;
use crate::playground::error::TransformError;

static SCRIPT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("script tag pattern is valid"));

const DEFAULT_MAX_SOURCE_BYTES: usize = 1024 * 1024;

/// Turns a raw buffer into directly executable source
pub trait Transform {
    fn transform(&self, source: &str) -> Result<String, TransformError>;
}

/// Remove every `<script>...</script>` block
pub fn strip_script_tags(source: &str) -> Cow<'_, str> {
    SCRIPT_TAG.replace_all(source, "")
}

/// Drop a leading byte order mark and turn `\r\n` and lone `\r` into `\n`
pub fn normalize_line_endings(source: &str) -> Cow<'_, str> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(source)
    }
}

/// The shipped transform: size limit, line ending normalization, script tag removal
#[derive(Debug, Clone)]
pub struct StandardTransform {
    strip_script_tags: bool,
    max_source_bytes: usize,
}

impl StandardTransform {
    pub fn new(config: &TransformConfig) -> Self {
        Self {
            strip_script_tags: config.strip_script_tags,
            max_source_bytes: config.max_source_bytes,
        }
    }
}

impl Default for StandardTransform {
    fn default() -> Self {
        Self {
            strip_script_tags: true,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
        }
    }
}

impl Transform for StandardTransform {
    fn transform(&self, source: &str) -> Result<String, TransformError> {
        if source.len() > self.max_source_bytes {
            return Err(TransformError::SourceTooLarge {
                size: source.len(),
                limit: self.max_source_bytes,
            });
        }

        let normalized = normalize_line_endings(source);
        let transformed = if self.strip_script_tags {
            strip_script_tags(&normalized).into_owned()
        } else {
            normalized.into_owned()
        };

        tracing::debug!(
            input_bytes = source.len(),
            output_bytes = transformed.len(),
            "transformed source"
        );
        Ok(transformed)
    }
}

/// Passes the buffer through untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    fn transform(&self, source: &str) -> Result<String, TransformError> {
        Ok(source.to_string())
    }
}
