mod console;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use klaxon_config::KlaxonConfig;
use klaxon_decoder::{DecodeError, decode};
use klaxon_engine::{Scheduler, SchedulerConfig};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleSink;

const CONFIG_ENV: &str = "KLAXON_CONFIG";

fn load_config() -> anyhow::Result<KlaxonConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => KlaxonConfig::load(path.as_str())
            .with_context(|| format!("loading config from {CONFIG_ENV}={path}")),
        Err(_) => Ok(KlaxonConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    // Notices own stdout; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let mut scheduler = Scheduler::new(
        SchedulerConfig {
            time_unit: config.time_unit(),
            poll_interval: config.poll_interval(),
        },
        Arc::new(ConsoleSink),
    );

    let mut lines = io::stdin().lock().lines();
    loop {
        print!("{}", config.prompt);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("reading command line")?;

        match decode(&line, config.max_message_len) {
            Ok(Some(command)) => {
                scheduler.submit(command).inspect_err(|e| {
                    error!(error = %e, reason = e.as_label(), "scheduler failed");
                })?;
            }
            Ok(None) => {}
            Err(DecodeError::BadCommand) => eprintln!("Bad command"),
            Err(e) => {
                debug!(error = %e, reason = e.as_label(), "line rejected");
                println!("Error: Incorrect format");
            }
        }

        scheduler.reap();
    }

    info!("input closed, shutting down");
    scheduler.shutdown();
    Ok(())
}
