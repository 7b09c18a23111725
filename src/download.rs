//! Event list download.
//!
//! Event lists are published together with a `mapfile.csv` index whose rows
//! map a CPU id pattern to a JSON file:
//!
//! ```text
//! Family-model,Version,Filename,EventType,...
//! GenuineIntel-6-3C,V35,/HSW/events/haswell_core.json,core,...
//! ```
//!
//! The matching `core` list is fetched and stored where
//! [`crate::paths::PathConfig::resolve`] looks for it.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::walker::WalkStats;

/// Default location of the event list repository.
pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/intel/perfmon/main";

/// One row of `mapfile.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    /// CPU id pattern, e.g. `GenuineIntel-6-55-[01234]`.
    pub pattern: String,
    pub version: String,
    /// Path of the JSON file relative to the repository root.
    pub file: String,
    /// `core`, `uncore`, `offcore`, ...
    pub event_type: String,
}

/// Parse `mapfile.csv`, skipping the header and malformed rows.
pub fn parse_mapfile(content: &str) -> Vec<MapEntry> {
    content
        .lines()
        .filter(|line| !line.starts_with("Family-model") && !line.trim().is_empty())
        .filter_map(|line| {
            let mut cols = line.split(',').map(str::trim);
            Some(MapEntry {
                pattern: cols.next()?.to_string(),
                version: cols.next()?.to_string(),
                file: cols.next()?.to_string(),
                event_type: cols.next()?.to_string(),
            })
        })
        .collect()
}

/// Whether a mapfile pattern matches a CPU id.
///
/// Patterns are literal ids, optionally ending in one `[...]` character
/// class standing for the stepping.
pub fn id_matches(pattern: &str, id: &str) -> bool {
    let Some((prefix, class)) = pattern.split_once('[') else {
        return pattern == id;
    };
    let Some(class) = class.strip_suffix(']') else {
        return false;
    };
    let Some(rest) = id.strip_prefix(prefix) else {
        return false;
    };
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => class.contains(c),
        _ => false,
    }
}

/// Find the `core` event list for a CPU id (without type suffix).
pub fn find_core_entry<'a>(entries: &'a [MapEntry], cpu_id: &str) -> Option<&'a MapEntry> {
    entries
        .iter()
        .filter(|e| e.event_type == "core")
        .find(|e| id_matches(&e.pattern, cpu_id))
}

/// Download the core event list for `cpu_id` into `events_dir`.
///
/// Writes `<events_dir>/<cpu_id>-core.json` and returns its path. The file
/// must parse as an event list before anything is written.
pub async fn download_events(cpu_id: &str, events_dir: &Path, base_url: &str) -> Result<PathBuf> {
    let base_url = base_url.trim_end_matches('/');
    let mapfile = fetch(&format!("{base_url}/mapfile.csv")).await?;
    let entries = parse_mapfile(&mapfile);
    let entry = find_core_entry(&entries, cpu_id)
        .ok_or_else(|| Error::Download(format!("no core event list for {cpu_id} in mapfile")))?;

    let url = format!("{base_url}/{}", entry.file.trim_start_matches('/'));
    info!(cpu = cpu_id, version = %entry.version, %url, "downloading event list");
    let body = fetch(&url).await?;

    // Validate before writing.
    let stats = validate_event_list(&url, &body)?;
    info!(%url, events = stats.events_emitted, "validated event list");

    std::fs::create_dir_all(events_dir).map_err(|e| Error::Write {
        path: events_dir.to_path_buf(),
        source: e,
    })?;
    let path = events_dir.join(format!("{cpu_id}-core.json"));
    std::fs::write(&path, &body).map_err(|e| Error::Write {
        path: path.clone(),
        source: e,
    })?;

    info!(path = %path.display(), "saved event list");
    Ok(path)
}

/// Check that `body` parses as an event list, walking every event.
pub fn validate_event_list(url: &str, body: &str) -> Result<WalkStats> {
    crate::parse_events(url, body, |_| 0)
        .map_err(|e| Error::Download(format!("{url} is not a usable event list: {e}")))
}

async fn fetch(url: &str) -> Result<String> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| Error::Download(format!("GET {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::Download(format!(
            "GET {url} returned {}",
            response.status()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| Error::Download(format!("reading response body: {e}")))
}
