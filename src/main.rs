use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use jevents::EventRecord;
use jevents::error::{Error, Result};
use jevents::paths::default_event_file;
#[cfg(feature = "download")]
use jevents::paths::PathConfig;

/// Read JSON performance-monitoring event lists.
///
/// Converts vendor event files into perf-style event strings. Without a file
/// argument the cached event list for the running CPU is used
/// (`$EVENTMAP`, or `$XDG_CACHE_HOME/pmu-events/<cpu>-core.json`).
#[derive(Parser)]
#[command(name = "jevents", version, about)]
struct Cli {
    /// Log more (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every event of an event file.
    List {
        /// Event file. Defaults to the cached list for this CPU.
        file: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Suppress the summary line.
        #[arg(long, short)]
        quiet: bool,
    },

    /// Print the default event file location.
    DefaultPath,

    /// Download the event list for this CPU into the cache directory.
    #[cfg(feature = "download")]
    Download {
        /// CPU id to download for, e.g. "GenuineIntel-6-3C".
        /// Defaults to the running CPU.
        #[arg(long)]
        cpu: Option<String>,

        /// Directory to store the list in.
        /// Defaults to <cache>/pmu-events.
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Base URL of the event list repository (holds mapfile.csv).
        #[arg(
            long,
            default_value = jevents::download::DEFAULT_BASE_URL,
            env = "PERFMON_URL"
        )]
        base_url: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// name, event and description separated by tabs.
    Text,
    /// One JSON object per line.
    Json,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");

        // Print cause chain.
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = std::error::Error::source(cause);
        }

        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::List {
            file,
            format,
            quiet,
        } => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let mut write_error = None;

            let result = jevents::json_events(file.as_deref(), |ev| {
                match write_event(&mut out, ev, format) {
                    Ok(()) => 0,
                    Err(e) => {
                        write_error = Some(e);
                        1
                    }
                }
            });
            if let Some(e) = write_error {
                return Err(Error::Write {
                    path: PathBuf::from("<stdout>"),
                    source: e,
                });
            }
            let stats = result?;

            if !quiet {
                eprintln!("{} events", stats.events_emitted);
                if stats.unknown_msr_warnings > 0 {
                    eprintln!("Some events use an unknown MSR and were listed without it");
                }
            }
        }

        Commands::DefaultPath => {
            let path = default_event_file().ok_or(Error::NoDefaultPath)?;
            println!("{}", path.display());
        }

        #[cfg(feature = "download")]
        Commands::Download {
            cpu,
            cache_dir,
            base_url,
        } => {
            let cpu = match cpu {
                Some(cpu) => cpu,
                None => jevents::cpu::CpuId::current()?.id_string(),
            };
            let events_dir = match cache_dir {
                Some(dir) => dir,
                None => PathConfig::from_env()
                    .events_dir()
                    .ok_or(Error::NoDefaultPath)?,
            };
            let rt = tokio::runtime::Runtime::new()
                .map_err(|e| Error::Download(e.to_string()))?;
            let path = rt.block_on(jevents::download::download_events(
                &cpu,
                &events_dir,
                &base_url,
            ))?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn write_event(out: &mut impl Write, ev: &EventRecord, format: Format) -> std::io::Result<()> {
    match format {
        Format::Text => writeln!(out, "{}\t{}\t{}", ev.name, ev.event, ev.description),
        Format::Json => {
            serde_json::to_writer(&mut *out, ev)?;
            writeln!(out)
        }
    }
}
