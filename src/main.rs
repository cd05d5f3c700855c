// SPDX-License-Identifier: Apache-2.0 OR MIT
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use udp_probe::config::LogConfig;
use udp_probe::logging::{ArenaKind, DrainSnapshot, Log, LogOutput};
use udp_probe::{log_long_prefixed, log_message, log_prefixed, log_verbose};

/// Drive the asynchronous logger with concurrent producers
#[derive(Parser, Debug, PartialEq)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of producer threads
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Messages per producer thread
    #[arg(short, long, default_value_t = 1000)]
    messages: u64,

    /// Append log lines to this file instead of stderr
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON5 logger configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured verbosity threshold
    #[arg(short, long)]
    verbosity: Option<i32>,

    /// Route producer lines through the long arena
    #[arg(long)]
    long: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    threads: usize,
    messages_per_thread: u64,
    short_allocations: u64,
    long_allocations: u64,
    elapsed_secs: f64,
    lines_per_sec: f64,
    drain: DrainSnapshot,
}

fn build_log(args: &Args) -> Result<Log> {
    let mut config = match &args.config {
        Some(path) => LogConfig::load_from_file(path)?,
        None => LogConfig::default(),
    };
    if let Some(verbosity) = args.verbosity {
        config.verbosity = verbosity;
    }

    let output = match &args.output {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            LogOutput::file(file)
        }
        None => LogOutput::Stderr,
    };

    Log::new(config, output).context("failed to start logger")
}

fn run(args: &Args) -> Result<Summary> {
    let log = Arc::new(build_log(args)?);
    log_message!(
        log,
        "logstress: {} threads x {} messages",
        args.threads,
        args.messages
    );

    let start = Instant::now();
    let producers: Vec<_> = (0..args.threads)
        .map(|t| {
            let log = Arc::clone(&log);
            let prefix = log.add_prefix(&format!("worker-{}", t));
            let (messages, long) = (args.messages, args.long);
            thread::Builder::new()
                .name(format!("producer-{}", t))
                .spawn(move || {
                    for seq in 0..messages {
                        if long {
                            log_long_prefixed!(log, prefix, "seq {} of {}", seq, messages);
                        } else {
                            log_prefixed!(log, prefix, "seq {} of {}", seq, messages);
                        }
                        log_verbose!(log, 2, "producer {} queued {}", t, seq);
                    }
                })
                .context("failed to spawn producer")
        })
        .collect::<Result<_>>()?;

    for producer in producers {
        if producer.join().is_err() {
            anyhow::bail!("producer thread panicked");
        }
    }

    log.shutdown();
    let elapsed = start.elapsed().as_secs_f64();
    let drain = log.stats();

    Ok(Summary {
        threads: args.threads,
        messages_per_thread: args.messages,
        short_allocations: log.arena_sequence(ArenaKind::Short),
        long_allocations: log.arena_sequence(ArenaKind::Long),
        elapsed_secs: elapsed,
        lines_per_sec: (drain.written + drain.abandoned) as f64 / elapsed.max(f64::EPSILON),
        drain,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let summary = run(&args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} lines written, {} abandoned, {} bytes in {:.3}s ({:.0} lines/s)",
            summary.drain.written,
            summary.drain.abandoned,
            summary.drain.bytes,
            summary.elapsed_secs,
            summary.lines_per_sec
        );
    }

    Ok(())
}
