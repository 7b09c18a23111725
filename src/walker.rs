//! Event list walker.
//!
//! Walks the token stream of an event file once, top to bottom. The file must
//! be an array of objects whose values are all strings; every object becomes
//! one [`EventRecord`] handed to the caller's sink.
//!
//! Known fields are translated into `key=value` pieces of a perf event string
//! (see [`crate::vocab`]); a few more feed the name and description. Unknown
//! fields are skipped. `PEBS` and `MSRIndex`/`MSRValue` depend on fields that
//! may come later in the object, so they are only resolved once the whole
//! object has been read.

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::builder::FieldBuf;
use crate::error::{Error, Result};
use crate::json::{Token, TokenKind, line_of};
use crate::vocab::{self, MsrEntry};

/// Marker that vendor descriptions use when they already mention PEBS.
const PRECISE_MARKER: &str = "(Precise Event)";

/// One normalized event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// Lowercase event name, e.g. `inst_retired.any`.
    pub name: String,
    /// Comma-separated perf parameters, e.g. `event=0xc0,umask=0x00`.
    pub event: String,
    /// Free text. May be empty.
    pub description: String,
}

/// Counters collected while walking.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkStats {
    pub events_emitted: usize,
    pub fields_skipped: usize,
    pub unknown_msr_warnings: usize,
}

/// Caller-owned state for one parse session.
///
/// Carries the file name used in diagnostics and the "unknown MSR" warning
/// flag, so the warning is printed once per session rather than once per
/// event. Reuse one context across files to keep warning once overall.
#[derive(Debug, Clone)]
pub struct ParseContext {
    file: String,
    warned_unknown_msr: bool,
    stats: WalkStats,
}

impl ParseContext {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            warned_unknown_msr: false,
            stats: WalkStats::default(),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Point diagnostics at another file, keeping warning state and stats.
    pub fn set_file(&mut self, file: impl Into<String>) {
        self.file = file.into();
    }

    pub fn warned_unknown_msr(&self) -> bool {
        self.warned_unknown_msr
    }

    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    pub fn into_stats(self) -> WalkStats {
        self.stats
    }

    fn lookup_msr(&mut self, value: &str) -> Option<&'static MsrEntry> {
        let entry = vocab::lookup_msr(value);
        if entry.is_none() && !self.warned_unknown_msr {
            self.warned_unknown_msr = true;
            self.stats.unknown_msr_warnings += 1;
            warn!(file = %self.file, msr = value, "unknown MSR in event file");
        }
        entry
    }
}

/// Walk `tokens` (produced from `source`) and feed each event to `sink`.
///
/// A non-zero return from `sink` stops the walk with [`Error::SinkAbort`].
/// An object without a name or without any encodable field stops it with
/// [`Error::IncompleteRecord`]; later objects are not looked at.
pub fn walk_events<F>(
    tokens: &[Token],
    source: &str,
    ctx: &mut ParseContext,
    sink: &mut F,
) -> Result<()>
where
    F: FnMut(&EventRecord) -> i32,
{
    let top = expect(tokens, source, ctx, 0, TokenKind::Array, "expected top level array")?;
    let mut cursor = 1;

    for index in 0..top.size {
        let obj = expect(tokens, source, ctx, cursor, TokenKind::Object, "expected object")?;
        cursor += 1;

        let mut pending = PendingEvent::default();
        let mut j = 0;
        while j < obj.size {
            let field = expect(
                tokens,
                source,
                ctx,
                cursor + j,
                TokenKind::String,
                "Expected field name",
            )?;
            let value = expect(
                tokens,
                source,
                ctx,
                cursor + j + 1,
                TokenKind::String,
                "Expected string value",
            )?;
            pending.add_field(field.text(source), value.text(source), ctx)?;
            j += 2;
        }

        let Some(record) = pending.finish()? else {
            return Err(Error::IncompleteRecord {
                file: ctx.file.clone(),
                index,
            });
        };
        let status = sink(&record);
        if status != 0 {
            debug!(file = %ctx.file, status, "event consumer aborted walk");
            return Err(Error::SinkAbort(status));
        }
        ctx.stats.events_emitted += 1;
        cursor += j;
    }

    if cursor != tokens.len() {
        return Err(structure_error(
            tokens,
            source,
            ctx,
            cursor,
            "unexpected objects at end",
        ));
    }
    Ok(())
}

/// Per-object state, dropped once the object has been emitted.
#[derive(Debug, Default)]
struct PendingEvent<'a> {
    name: FieldBuf,
    event: FieldBuf,
    description: FieldBuf,
    precise: Option<&'a str>,
    msr: Option<&'static MsrEntry>,
    msr_value: Option<&'a str>,
}

impl<'a> PendingEvent<'a> {
    fn add_field(&mut self, field: &str, value: &'a str, ctx: &mut ParseContext) -> Result<()> {
        let non_zero = value != "0";

        if let Some(frag) = vocab::match_field(field, non_zero, value) {
            return self.event.append(",", frag.key, Some(frag.value));
        }

        match field {
            "EventName" => self.name.append("", "", Some(value))?,
            "BriefDescription" => {
                self.description.append("", "", Some(value))?;
                self.description.trim_trailing_dot();
            }
            "PEBS" if non_zero && !self.description.contains(PRECISE_MARKER) => {
                self.precise = Some(value);
            }
            "MSRIndex" if non_zero => self.msr = ctx.lookup_msr(value),
            "MSRValue" => self.msr_value = Some(value),
            "Errata" if value != "null" => {
                self.description
                    .append(". ", "Spec update: ", Some(value))?;
            }
            "Data_LA" if non_zero => {
                self.description
                    .append(". ", "Supports address when precise", None)?;
            }
            _ => {
                trace!(field, value, "skipping field");
                ctx.stats.fields_skipped += 1;
            }
        }
        Ok(())
    }

    /// Resolve deferred fields. `None` if the object cannot form an event.
    fn finish(mut self) -> Result<Option<EventRecord>> {
        if let Some(precise) = self.precise {
            let note = if precise == "2" {
                "(Must be precise)"
            } else {
                "(Precise event)"
            };
            self.description.append(" ", note, None)?;
        }
        if let Some(msr) = self.msr {
            self.event.append(",", msr.param, self.msr_value)?;
        }

        if self.name.is_empty() || self.event.is_empty() {
            return Ok(None);
        }
        self.name.make_lowercase();
        Ok(Some(EventRecord {
            name: self.name.into_string(),
            event: self.event.into_string(),
            description: self.description.into_string(),
        }))
    }
}

fn expect<'t>(
    tokens: &'t [Token],
    source: &str,
    ctx: &ParseContext,
    index: usize,
    kind: TokenKind,
    message: &'static str,
) -> Result<&'t Token> {
    match tokens.get(index) {
        Some(tok) if tok.kind == kind => Ok(tok),
        _ => Err(structure_error(tokens, source, ctx, index, message)),
    }
}

/// Build a structural error for the token at `index`.
///
/// A token starting at offset 0 that is not the first token is located by
/// its predecessor; a position past the end by the last token.
fn structure_error(
    tokens: &[Token],
    source: &str,
    ctx: &ParseContext,
    index: usize,
    message: &'static str,
) -> Error {
    let (loc, got) = match tokens.get(index) {
        Some(tok) if tok.start == 0 && index > 0 => (Some(&tokens[index - 1]), tok.kind.name()),
        Some(tok) => (Some(tok), tok.kind.name()),
        None => (tokens.last(), "end of input"),
    };
    Error::Structure {
        file: ctx.file.clone(),
        line: loc.map_or(1, |t| line_of(source, t.start)),
        message,
        got,
    }
}
