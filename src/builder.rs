//! Growable text buffer used to assemble event names, strings and
//! descriptions.

use crate::error::Result;

/// Append-only text buffer with separator-joined appends.
///
/// Growth goes through [`String::try_reserve`], so running out of memory is
/// reported as [`crate::error::Error::OutOfMemory`] instead of aborting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldBuf {
    buf: String,
}

impl FieldBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `prefix` and then `value`.
    ///
    /// `sep` is written first unless the buffer is still empty.
    pub fn append(&mut self, sep: &str, prefix: &str, value: Option<&str>) -> Result<()> {
        let sep = if self.buf.is_empty() { "" } else { sep };
        let extra = sep.len() + prefix.len() + value.map_or(0, str::len);
        self.buf.try_reserve(extra)?;
        self.buf.push_str(sep);
        self.buf.push_str(prefix);
        if let Some(value) = value {
            self.buf.push_str(value);
        }
        Ok(())
    }

    /// Drop a trailing `.`, along with any whitespace after it.
    ///
    /// `"Stalls due to X. "` becomes `"Stalls due to X"`. Text that does not
    /// end in a dot is left alone, trailing whitespace included.
    pub fn trim_trailing_dot(&mut self) {
        let trimmed = self.buf.trim_end_matches(|c: char| c.is_ascii_whitespace());
        if trimmed.ends_with('.') {
            let len = trimmed.len() - 1;
            self.buf.truncate(len);
        }
    }

    pub fn make_lowercase(&mut self) {
        self.buf.make_ascii_lowercase();
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.buf.contains(needle)
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}
