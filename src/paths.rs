//! Default event file location.
//!
//! When no file is named, the event list is looked up as
//! `<cache>/pmu-events/<cpu-id>-core.json`, where `<cache>` is
//! `$XDG_CACHE_HOME` or `$HOME/.cache`. `$EVENTMAP` overrides this: if it
//! names a readable file that file is used directly, otherwise its value
//! replaces the CPU id.

use std::path::{Path, PathBuf};

use crate::cpu::CpuId;

/// Environment inputs for default path resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathConfig {
    /// `EVENTMAP`: an event file, or a CPU id to look up in the cache.
    pub event_map: Option<String>,
    /// `XDG_CACHE_HOME`.
    pub cache_home: Option<PathBuf>,
    /// `HOME`, used when `XDG_CACHE_HOME` is unset.
    pub home: Option<PathBuf>,
}

impl PathConfig {
    /// Capture the relevant variables from the process environment.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var_os(name).filter(|v| !v.is_empty());
        Self {
            event_map: var("EVENTMAP").map(|v| v.to_string_lossy().into_owned()),
            cache_home: var("XDG_CACHE_HOME").map(PathBuf::from),
            home: var("HOME").map(PathBuf::from),
        }
    }

    /// Directory holding cached event lists: `<cache>/pmu-events`.
    pub fn events_dir(&self) -> Option<PathBuf> {
        let cache = match (&self.cache_home, &self.home) {
            (Some(cache), _) => cache.clone(),
            (None, Some(home)) => home.join(".cache"),
            (None, None) => return None,
        };
        Some(cache.join("pmu-events"))
    }

    /// Resolve the default event file.
    ///
    /// `cpu` is consulted only when `EVENTMAP` does not settle the question;
    /// it returns the CPU id including the `-core` suffix.
    pub fn resolve<F>(&self, cpu: F) -> Option<PathBuf>
    where
        F: FnOnce() -> Option<String>,
    {
        let id = match &self.event_map {
            Some(map) if is_readable(Path::new(map)) => return Some(PathBuf::from(map)),
            Some(map) => format!("{map}-core"),
            None => cpu()?,
        };
        Some(self.events_dir()?.join(format!("{id}.json")))
    }
}

/// Default event file for the running CPU and process environment.
pub fn default_event_file() -> Option<PathBuf> {
    PathConfig::from_env().resolve(|| match CpuId::current() {
        Ok(cpu) => Some(cpu.id_with_type("core")),
        Err(e) => {
            tracing::debug!("cannot identify cpu: {e}");
            None
        }
    })
}

fn is_readable(path: &Path) -> bool {
    std::fs::File::open(path).is_ok()
}
