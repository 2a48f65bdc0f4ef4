use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};

use netwatch::config::Settings;
use netwatch::filter::FilterMode;
use netwatch::output::{OutputFormat, OutputFormatter};
use netwatch::snapshot::Snapshot;

/// Decode the kernel TCP socket table and filter it by peer locality.
#[derive(Parser, Debug)]
#[command(name = "netwatch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Socket table to read, repeatable [default: /proc/net/tcp]
    #[arg(short = 's', long = "source", value_name = "PATH")]
    sources: Vec<PathBuf>,

    /// Also read /proc/net/tcp6
    #[arg(long = "ipv6")]
    ipv6: bool,

    /// Show only connections whose peer is local or public
    #[arg(short = 'f', long = "filter", value_enum)]
    filter: Option<FilterMode>,

    /// Refresh until interrupted instead of printing one snapshot
    #[arg(short = 'w', long = "watch")]
    watch: bool,

    /// Seconds between refreshes in watch mode [default: 2]
    #[arg(short = 'i', long = "interval", value_name = "SECS")]
    interval: Option<u64>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "table")]
    format: OutputFormat,

    /// JSON settings file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Command line over settings file over defaults.
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if !self.sources.is_empty() {
            settings.sources = self.sources.clone();
        }
        if self.ipv6 {
            settings.ipv6 = true;
        }
        if let Some(filter) = self.filter {
            settings.filter = filter;
        }
        if let Some(secs) = self.interval {
            settings.refresh_interval_secs = secs;
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let settings = args.settings()?;
    debug!("settings: {settings:?}");
    let formatter = OutputFormatter::new(args.format);

    if args.watch {
        watch(&settings, &formatter, tokio::signal::ctrl_c()).await
    } else {
        let snapshot = capture(&settings.source_paths()).await?;
        let mut stdout = io::stdout().lock();
        formatter.write(&snapshot, settings.filter, &mut stdout)?;
        stdout.flush()?;
        Ok(())
    }
}

async fn capture(sources: &[PathBuf]) -> Result<Snapshot> {
    let sources = sources.to_vec();
    let snapshot = tokio::task::spawn_blocking(move || Snapshot::capture(sources.as_slice()))
        .await
        .context("snapshot task panicked")??;
    Ok(snapshot)
}

/// Refreshes until `shutdown` completes. The future lives across ticks, so a
/// signal delivered while a snapshot is being taken is not lost.
async fn watch<F: Future>(
    settings: &Settings,
    formatter: &OutputFormatter,
    shutdown: F,
) -> Result<()> {
    tokio::pin!(shutdown);
    let sources = settings.source_paths();
    let every = settings.refresh_interval();
    let clear = io::stdout().is_terminal();
    let mut interval = tokio::time::interval(every);

    info!("watching {} source(s) every {:?}", sources.len(), every);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let result = capture(&sources).await;

                let mut stdout = io::stdout().lock();
                if clear {
                    write!(stdout, "\x1b[2J\x1b[H")?;
                }
                match result {
                    Ok(snapshot) => {
                        writeln!(stdout, "netwatch @ {}\n", snapshot.captured_at.format("%H:%M:%S"))?;
                        formatter.write(&snapshot, settings.filter, &mut stdout)?;
                    }
                    Err(e) => {
                        // Next tick retries.
                        warn!("snapshot failed: {e:#}");
                        writeln!(stdout, "Error: {e:#}\n\nRetrying in {}s, Ctrl-C to quit", every.as_secs())?;
                    }
                }
                stdout.flush()?;
            }
            _ = &mut shutdown => {
                info!("interrupted, exiting");
                break;
            }
        }
    }

    Ok(())
}
