//! Read JSON performance-monitoring event lists.
//!
//! `jevents` turns the vendor event files published for each CPU model (an
//! array of objects such as `{"EventCode": "0x3C", "UMask": "0x00",
//! "EventName": "CPU_CLK_UNHALTED.THREAD_P", ...}`) into normalized records:
//!
//! - a lowercase event name (`cpu_clk_unhalted.thread_p`)
//! - a perf-style event string (`event=0x3C,umask=0x00`) built from the
//!   fields perf understands, with zero values left out and MSR-backed
//!   parameters such as `ldlat=` or `offcore_rsp=` appended last
//! - a cleaned-up description annotated with PEBS and errata notes
//!
//! Structural problems are reported with file name and line; unknown fields
//! are ignored.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! let stats = jevents::json_events(Some(Path::new("haswell_core.json")), |ev| {
//!     println!("{} -> {}", ev.name, ev.event);
//!     0
//! })?;
//! eprintln!("{} events", stats.events_emitted);
//! # Ok::<(), jevents::error::Error>(())
//! ```

pub mod builder;
pub mod cpu;
#[cfg(feature = "download")]
pub mod download;
pub mod error;
pub mod json;
pub mod paths;
pub mod vocab;
pub mod walker;

use std::path::Path;

use tracing::debug;

pub use error::{Error, Result, status_of};
pub use walker::{EventRecord, ParseContext, WalkStats, walk_events};

/// Read an event file and call `sink` for every event in it.
///
/// With `path` set to `None` the default location for the running CPU is
/// used (see [`paths`]). `sink` returns `0` to continue; anything else stops
/// the walk and is returned as [`Error::SinkAbort`].
pub fn json_events<F>(path: Option<&Path>, sink: F) -> Result<WalkStats>
where
    F: FnMut(&EventRecord) -> i32,
{
    let default;
    let path = match path {
        Some(path) => path,
        None => {
            default = paths::default_event_file().ok_or(Error::NoDefaultPath)?;
            default.as_path()
        }
    };

    let source = std::fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_events(&path.display().to_string(), &source, sink)
}

/// Parse event list text. `file` names the source in diagnostics.
pub fn parse_events<F>(file: &str, source: &str, sink: F) -> Result<WalkStats>
where
    F: FnMut(&EventRecord) -> i32,
{
    let mut ctx = ParseContext::new(file);
    parse_events_in(&mut ctx, source, sink)?;
    Ok(ctx.into_stats())
}

/// Parse event list text within an existing session.
///
/// The unknown-MSR warning is printed at most once per `ctx`, however many
/// files it is used for.
pub fn parse_events_in<F>(ctx: &mut ParseContext, source: &str, mut sink: F) -> Result<()>
where
    F: FnMut(&EventRecord) -> i32,
{
    let tokens = json::tokenize(source).map_err(|e| e.into_error(ctx.file(), source))?;
    debug!(file = ctx.file(), tokens = tokens.len(), "tokenized event file");
    walk_events(&tokens, source, ctx, &mut sink)
}
